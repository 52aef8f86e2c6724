use crate::error::{FfstageError, Result};

/// Split a shell-style command string into arguments.
///
/// Single and double quotes group whitespace into one argument and
/// backslashes escape the next character. An unterminated quote is rejected
/// rather than guessed at.
pub fn split_args(command: &str) -> Result<Vec<String>> {
    shell_words::split(command)
        .map_err(|e| FfstageError::CommandSyntax(format!("{}: {}", e, command)))
}

/// Render arguments back into a string that `split_args` reads identically
pub fn join_args<S: AsRef<str>>(args: &[S]) -> String {
    shell_words::join(args.iter().map(|a| a.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_split() {
        let args = split_args("-i in.mp4 -c:v libx264 out.mp4").unwrap();
        assert_eq!(args, vec!["-i", "in.mp4", "-c:v", "libx264", "out.mp4"]);
    }

    #[test]
    fn test_quotes_group_whitespace() {
        let args = split_args(r#"-i "my video.mp4" -vf 'scale=1280:720, fps=30' out.mp4"#).unwrap();
        assert_eq!(args, vec!["-i", "my video.mp4", "-vf", "scale=1280:720, fps=30", "out.mp4"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_args("").unwrap().is_empty());
        assert!(split_args("   ").unwrap().is_empty());
    }

    #[test]
    fn test_unterminated_quote_is_rejected() {
        let err = split_args(r#"-i "in.mp4 out.mp4"#).unwrap_err();
        assert!(matches!(err, FfstageError::CommandSyntax(_)));
    }

    #[test]
    fn test_join_quotes_when_needed() {
        let args = vec!["-i".to_string(), "my video.mp4".to_string(), "out.mp4".to_string()];
        let joined = join_args(&args);
        assert_eq!(split_args(&joined).unwrap(), args);
        assert_eq!(join_args(&["-i", "in.mp4"]), "-i in.mp4");
    }
}
