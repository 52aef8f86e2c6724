use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, error, info};

use crate::config::TranscoderConfig;
use crate::error::{FfstageError, Result};
use crate::process::ExternalCommand;

/// Main trait for running the external transcoder
#[async_trait]
pub trait TranscoderTrait: Send + Sync {
    /// Run the transcoder with `args` inside `working_dir`.
    ///
    /// `executable` overrides the configured binary for this invocation.
    async fn transcode(
        &self,
        executable: Option<&Path>,
        args: &[String],
        working_dir: &Path,
    ) -> Result<()>;

    /// Check if the transcoder binary can be executed
    async fn check_availability(&self, executable: Option<&Path>) -> Result<()>;
}

/// Factory for creating transcoder instances
pub struct TranscoderFactory;

impl TranscoderFactory {
    /// Create the default transcoder implementation (FFmpeg-based)
    pub fn create_transcoder(config: TranscoderConfig) -> Box<dyn TranscoderTrait> {
        Box::new(FfmpegTranscoder::new(config))
    }
}

/// FFmpeg-based transcoder
pub struct FfmpegTranscoder {
    config: TranscoderConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    fn binary(&self, executable: Option<&Path>) -> String {
        match executable {
            Some(path) => path.to_string_lossy().into_owned(),
            None => self.config.binary_path.clone(),
        }
    }
}

#[async_trait]
impl TranscoderTrait for FfmpegTranscoder {
    async fn transcode(
        &self,
        executable: Option<&Path>,
        args: &[String],
        working_dir: &Path,
    ) -> Result<()> {
        let binary = self.binary(executable);
        info!("Running {} in {}", binary, working_dir.display());

        let output = ExternalCommand::new(&binary, "Transcode")
            .args(args.iter().cloned())
            .current_dir(working_dir)
            .output()
            .await?;

        if !output.success {
            error!("FFmpeg failed with exit code {:?}", output.code);
            error!("{}", output.stderr.trim());
            return Err(FfstageError::Transcoder(output.diagnostics()));
        }

        info!("Transcode completed successfully");
        Ok(())
    }

    async fn check_availability(&self, executable: Option<&Path>) -> Result<()> {
        let output = ExternalCommand::new(self.binary(executable), "Version check")
            .arg("-version")
            .output()
            .await?;

        if output.success {
            // First line carries the version banner
            debug!("{}", output.stdout.lines().next().unwrap_or("Unknown version"));
            Ok(())
        } else {
            Err(FfstageError::Transcoder(format!(
                "version check failed: {}",
                output.diagnostics()
            )))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn transcoder(binary: &str) -> FfmpegTranscoder {
        FfmpegTranscoder::new(TranscoderConfig { binary_path: binary.to_string() })
    }

    #[tokio::test]
    async fn test_success_exit() {
        let dir = tempfile::tempdir().unwrap();
        let args = vec!["-i".to_string(), "in.mp4".to_string(), "out.mp4".to_string()];
        tokio_test::assert_ok!(transcoder("true").transcode(None, &args, dir.path()).await);
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_transcoder_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = transcoder("false").transcode(None, &[], dir.path()).await.unwrap_err();
        assert!(matches!(err, FfstageError::Transcoder(_)));
    }

    #[tokio::test]
    async fn test_executable_override() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = transcoder("/nonexistent/ffmpeg");
        let override_path = PathBuf::from("true");
        tokio_test::assert_ok!(
            ffmpeg.transcode(Some(override_path.as_path()), &[], dir.path()).await
        );
        assert!(ffmpeg.transcode(None, &[], dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_writes_into_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let args = vec!["out.mp4".to_string()];
        transcoder("touch").transcode(None, &args, dir.path()).await.unwrap();
        assert!(dir.path().join("out.mp4").exists());
    }

    #[tokio::test]
    async fn test_check_availability() {
        tokio_test::assert_ok!(transcoder("echo").check_availability(None).await);
        assert!(transcoder("false").check_availability(None).await.is_err());

        let missing = transcoder("/nonexistent/ffmpeg");
        assert!(matches!(
            missing.check_availability(None).await,
            Err(FfstageError::Process { .. })
        ));
        let override_path = PathBuf::from("echo");
        tokio_test::assert_ok!(missing.check_availability(Some(override_path.as_path())).await);
    }
}
