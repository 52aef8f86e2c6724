use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::command::join_args;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an ffmpeg command whose input/output may live in S3
    Run {
        /// ffmpeg arguments, as one quoted string or after `--`
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,

        /// Root directory for per-job staging directories
        #[arg(long)]
        staging_dir: Option<PathBuf>,

        /// ffmpeg executable to use instead of the configured one
        #[arg(long)]
        ffmpeg: Option<PathBuf>,

        /// S3 endpoint override forwarded to the storage CLI
        #[arg(long, env = "S3_ENDPOINT_URL")]
        endpoint_url: Option<String>,

        /// Print the job report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how a command would be rewritten without running ffmpeg
    Rewrite {
        /// ffmpeg arguments, as one quoted string or after `--`
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,

        /// Root directory for per-job staging directories
        #[arg(long)]
        staging_dir: Option<PathBuf>,

        /// S3 endpoint override forwarded to the storage CLI
        #[arg(long, env = "S3_ENDPOINT_URL")]
        endpoint_url: Option<String>,

        /// Print the rewritten arguments as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a configuration file with default values
    InitConfig {
        /// Destination path
        #[arg(default_value = "ffstage.toml")]
        path: PathBuf,
    },
}

/// A single argument is taken as the whole command string; several are
/// re-quoted so the tokenizer sees them exactly as the shell passed them
pub fn command_string(parts: &[String]) -> String {
    match parts {
        [single] => single.clone(),
        _ => join_args(parts),
    }
}
