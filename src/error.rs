use thiserror::Error;

#[derive(Error, Debug)]
pub enum FfstageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No ffmpeg command string provided")]
    MissingCommand,

    #[error("Malformed command string: {0}")]
    CommandSyntax(String),

    #[error("No input file specified in ffmpeg command")]
    NoInput,

    #[error("No output file specified in ffmpeg command")]
    NoOutput,

    #[error("Failed to generate signed URL for {url}: {message}")]
    Presign { url: String, message: String },

    #[error("Failed to execute {program}: {message}")]
    Process { program: String, message: String },

    #[error("FFmpeg failed: {0}")]
    Transcoder(String),

    #[error("Output file {0} not found in staging directory")]
    OutputNotFound(String),

    #[error("Unsupported protocol for upload: {0}")]
    UnsupportedScheme(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("HLS sync failed: {0}")]
    Sync(String),
}

pub type Result<T> = std::result::Result<T, FfstageError>;
