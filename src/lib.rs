//! ffstage - run ffmpeg command lines against S3 inputs and outputs
//!
//! Rewrites an ffmpeg-style command so every S3 reference is reachable from
//! a local process (presigned URLs for inputs, a per-job staging directory
//! for outputs), runs ffmpeg there, and reconciles the staged results back
//! onto the declared destination.

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod process;
pub mod reconciler;
pub mod resolver;
pub mod staging;
pub mod storage;
pub mod transcoder;
pub mod workflow;
