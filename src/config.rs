use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::error::{FfstageError, Result};

/// Staging root used when neither the config nor the job names one
pub const DEFAULT_STAGING_ROOT: &str = "/tmp/data";

// Signed URLs stay valid for six hours
fn default_presign_expires_secs() -> u64 {
    21_600
}

fn default_cleanup() -> bool {
    false
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub staging: StagingConfig,
    pub transcoder: TranscoderConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Directory under which per-job staging directories are created
    pub root: PathBuf,
    /// Remove the job directory once its contents have been reconciled
    #[serde(default = "default_cleanup")]
    pub cleanup: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscoderConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the aws CLI binary
    pub binary_path: String,
    /// Endpoint override forwarded to every storage invocation (e.g. MinIO)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    /// Lifetime of generated signed URLs in seconds
    #[serde(default = "default_presign_expires_secs")]
    pub presign_expires_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for the daily-rotated log file; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl StorageConfig {
    pub fn presign_expiry(&self) -> Duration {
        Duration::from_secs(self.presign_expires_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            staging: StagingConfig {
                root: PathBuf::from(DEFAULT_STAGING_ROOT),
                cleanup: false,
            },
            transcoder: TranscoderConfig {
                binary_path: "ffmpeg".to_string(),
            },
            storage: StorageConfig {
                binary_path: "aws".to_string(),
                endpoint_url: None,
                presign_expires_secs: default_presign_expires_secs(),
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FfstageError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| FfstageError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FfstageError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| FfstageError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Replace the endpoint override when one is supplied
    pub fn with_endpoint_url(mut self, endpoint_url: Option<String>) -> Self {
        if let Some(url) = endpoint_url.filter(|u| !u.trim().is_empty()) {
            self.storage.endpoint_url = Some(url);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.staging.root, PathBuf::from("/tmp/data"));
        assert_eq!(config.transcoder.binary_path, "ffmpeg");
        assert_eq!(config.storage.binary_path, "aws");
        assert_eq!(config.storage.presign_expiry(), Duration::from_secs(21_600));
        assert!(config.storage.endpoint_url.is_none());
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ffstage.toml");

        let config = Config::default().with_endpoint_url(Some("http://minio:9000".to_string()));
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.storage.endpoint_url.as_deref(), Some("http://minio:9000"));
        assert_eq!(loaded.staging.root, config.staging.root);
    }

    #[test]
    fn test_partial_file_uses_field_defaults() {
        let toml = r#"
            [staging]
            root = "/scratch"

            [transcoder]
            binary_path = "/opt/ffmpeg/bin/ffmpeg"

            [storage]
            binary_path = "aws"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.staging.cleanup);
        assert_eq!(config.storage.presign_expires_secs, 21_600);
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn test_blank_endpoint_is_ignored() {
        let config = Config::default().with_endpoint_url(Some("  ".to_string()));
        assert!(config.storage.endpoint_url.is_none());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::from_file("/nonexistent/ffstage.toml").unwrap_err();
        assert!(matches!(err, FfstageError::Config(_)));
    }
}
