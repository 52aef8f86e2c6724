use crate::error::{FfstageError, Result};
use super::location::OBJECT_STORE_SCHEME;

/// Flag introducing an input
pub const INPUT_FLAG: &str = "-i";

/// HLS muxer option naming the segment files
pub const SEGMENT_FILENAME_FLAG: &str = "-hls_segment_filename";

const FLAG_PREFIX: char = '-';

/// Positions of the tokens the resolver cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub input: usize,
    pub output: usize,
    pub segment_pattern: Option<usize>,
}

/// Locate the input, output and HLS segment pattern in a tokenized command.
///
/// The first `-i` wins, the output is the last token that is not a flag, and
/// the segment pattern is the first `-hls_segment_filename` value pointing
/// at the object store.
pub fn classify(tokens: &[String]) -> Result<Classification> {
    let input = find_input(tokens).ok_or(FfstageError::NoInput)?;
    let output = find_output(tokens).ok_or(FfstageError::NoOutput)?;
    let segment_pattern = find_segment_pattern(tokens);

    Ok(Classification { input, output, segment_pattern })
}

fn find_input(tokens: &[String]) -> Option<usize> {
    tokens
        .iter()
        .enumerate()
        .find(|(i, arg)| *arg == INPUT_FLAG && i + 1 < tokens.len())
        .map(|(i, _)| i + 1)
}

fn find_output(tokens: &[String]) -> Option<usize> {
    tokens.iter().rposition(|arg| !arg.starts_with(FLAG_PREFIX))
}

fn find_segment_pattern(tokens: &[String]) -> Option<usize> {
    tokens
        .windows(2)
        .position(|pair| {
            pair[0] == SEGMENT_FILENAME_FLAG && pair[1].starts_with(OBJECT_STORE_SCHEME)
        })
        .map(|i| i + 1)
}
