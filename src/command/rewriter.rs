use serde::Serialize;
use std::path::Path;

use super::tokenizer::join_args;

/// Literal token text mapped to its resolved form.
///
/// Keys are unique and the first resolution recorded for a literal is the
/// one used everywhere that literal appears in the command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplacementTable {
    entries: Vec<(String, String)>,
}

impl ReplacementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolution; returns false and keeps the existing one if the
    /// literal is already mapped
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, literal: K, resolved: V) -> bool {
        let literal = literal.into();
        if self.contains(&literal) {
            return false;
        }
        self.entries.push((literal, resolved.into()));
        true
    }

    pub fn get(&self, literal: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == literal)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, literal: &str) -> bool {
        self.get(literal).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The command as it will be handed to the transcoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewrittenCommand {
    pub args: Vec<String>,
    pub command_string: String,
}

impl RewrittenCommand {
    pub fn new(args: Vec<String>) -> Self {
        let command_string = join_args(&args);
        Self { args, command_string }
    }
}

/// Substitute resolved locations into the token list.
///
/// Works on token positions rather than substrings, so a literal embedded in
/// an unrelated argument is left alone. The output position always receives
/// the local staging path.
pub fn rewrite(
    tokens: &[String],
    table: &ReplacementTable,
    output_index: usize,
    local_output: &Path,
) -> RewrittenCommand {
    let args = tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            if i == output_index {
                local_output.to_string_lossy().into_owned()
            } else {
                table.get(token).unwrap_or(token.as_str()).to_string()
            }
        })
        .collect();

    RewrittenCommand::new(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::split_args;

    #[test]
    fn test_first_resolution_wins() {
        let mut table = ReplacementTable::new();
        assert!(table.insert("s3://bucket/a.mp4", "https://signed/a"));
        assert!(!table.insert("s3://bucket/a.mp4", "https://signed/other"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("s3://bucket/a.mp4"), Some("https://signed/a"));
    }

    #[test]
    fn test_rewrite_preserves_unrelated_tokens() {
        let tokens =
            split_args("-i s3://in/video.mp4 -vf 'scale=640:-2' -c:v libx264 out.mp4").unwrap();
        let mut table = ReplacementTable::new();
        table.insert("s3://in/video.mp4", "https://signed.example/video.mp4?sig=1");

        let rewritten = rewrite(&tokens, &table, 6, Path::new("/tmp/data/job/out.mp4"));
        assert_eq!(
            rewritten.args,
            vec![
                "-i",
                "https://signed.example/video.mp4?sig=1",
                "-vf",
                "scale=640:-2",
                "-c:v",
                "libx264",
                "/tmp/data/job/out.mp4",
            ]
        );
        assert_eq!(split_args(&rewritten.command_string).unwrap(), rewritten.args);
    }

    #[test]
    fn test_every_occurrence_gets_the_same_resolution() {
        let tokens = split_args("-i s3://b/in.mp4 -i s3://b/in.mp4 -map 0 -map 1 out.mp4").unwrap();
        let mut table = ReplacementTable::new();
        table.insert("s3://b/in.mp4", "https://signed/in");

        let rewritten = rewrite(&tokens, &table, 8, Path::new("/stage/out.mp4"));
        assert_eq!(rewritten.args[1], "https://signed/in");
        assert_eq!(rewritten.args[3], "https://signed/in");
    }

    #[test]
    fn test_substrings_are_not_replaced() {
        let tokens =
            split_args("-i s3://b/in.mp4 -metadata comment=s3://b/in.mp4 out.mp4").unwrap();
        let mut table = ReplacementTable::new();
        table.insert("s3://b/in.mp4", "https://signed/in");

        let rewritten = rewrite(&tokens, &table, 4, Path::new("/stage/out.mp4"));
        assert_eq!(rewritten.args[3], "comment=s3://b/in.mp4");
    }
}
