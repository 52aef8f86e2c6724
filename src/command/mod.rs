// Command-string analysis
//
// The transcoder command arrives as a single shell-style string. This module
// turns it into something the resolver can work with, without a full ffmpeg
// grammar:
// - Tokenizer: shell-style splitting and re-joining
// - Location: parsed input/output references (local, s3://, unsupported)
// - Classifier: which token is the input, the output and the HLS segment pattern
// - Rewriter: replacement table and index-based substitution

pub mod classifier;
pub mod location;
pub mod rewriter;
pub mod tokenizer;

pub use classifier::*;
pub use location::*;
pub use rewriter::*;
pub use tokenizer::*;
