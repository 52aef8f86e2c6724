use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::StorageConfig;
use crate::error::{FfstageError, Result};
use crate::process::ExternalCommand;
use super::ObjectStorageTrait;

/// Storage backed by the `aws s3` command line
pub struct AwsCliStorage {
    config: StorageConfig,
}

impl AwsCliStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// `aws s3 [--endpoint-url <url>]` prefix shared by every operation
    fn s3_command(&self, description: &str) -> ExternalCommand {
        ExternalCommand::new(&self.config.binary_path, description)
            .arg("s3")
            .optional_arg("--endpoint-url", self.config.endpoint_url.as_deref())
    }
}

#[async_trait]
impl ObjectStorageTrait for AwsCliStorage {
    async fn presign(&self, url: &str, expires_in: Duration) -> Result<String> {
        info!("Generating signed URL for {}", url);

        let output = self
            .s3_command("Presign")
            .arg("presign")
            .arg(url)
            .arg("--expires-in")
            .arg(expires_in.as_secs().to_string())
            .output()
            .await
            .map_err(|e| FfstageError::Presign {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if !output.success {
            error!("Failed to generate signed URL for {}: {}", url, output.stderr.trim());
            return Err(FfstageError::Presign {
                url: url.to_string(),
                message: output.diagnostics(),
            });
        }

        let signed = output.stdout.trim().to_string();
        if signed.is_empty() {
            return Err(FfstageError::Presign {
                url: url.to_string(),
                message: "storage CLI returned an empty URL".to_string(),
            });
        }

        debug!("Signed URL for {} generated", url);
        Ok(signed)
    }

    async fn sync(&self, local_dir: &Path, remote_prefix: &str) -> Result<()> {
        info!("Syncing {} to {}", local_dir.display(), remote_prefix);

        // Trailing separator makes the CLI mirror the directory's contents
        let source = format!("{}/", local_dir.to_string_lossy().trim_end_matches('/'));
        let output = self
            .s3_command("Sync")
            .arg("sync")
            .arg(source)
            .arg(remote_prefix)
            .output()
            .await?;

        if !output.success {
            error!("Sync to {} failed: {}", remote_prefix, output.stderr.trim());
            return Err(FfstageError::Sync(output.diagnostics()));
        }

        info!("Successfully synced output to {}", remote_prefix);
        Ok(())
    }

    async fn copy(&self, local_path: &Path, remote: &str, recursive: bool) -> Result<()> {
        info!("Uploading {} to {}", local_path.display(), remote);

        let mut command = self.s3_command("Upload").arg("cp");
        if recursive {
            command = command.arg("--recursive");
        }
        let output = command.path_arg(local_path).arg(remote).output().await?;

        if !output.success {
            error!("Upload to {} failed: {}", remote, output.stderr.trim());
            return Err(FfstageError::Upload(output.diagnostics()));
        }

        info!("Uploaded {}", remote);
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn storage(binary: &str, endpoint: Option<&str>) -> AwsCliStorage {
        AwsCliStorage::new(StorageConfig {
            binary_path: binary.to_string(),
            endpoint_url: endpoint.map(str::to_string),
            presign_expires_secs: 21_600,
        })
    }

    // `echo` stands in for the CLI so the argument list comes back as the "URL"

    #[tokio::test]
    async fn test_presign_arguments() {
        let signed = storage("echo", None)
            .presign("s3://bucket/in.mp4", Duration::from_secs(21_600))
            .await
            .unwrap();
        assert_eq!(signed, "s3 presign s3://bucket/in.mp4 --expires-in 21600");
    }

    #[tokio::test]
    async fn test_endpoint_is_forwarded() {
        let signed = storage("echo", Some("http://minio:9000"))
            .presign("s3://bucket/in.mp4", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            signed,
            "s3 --endpoint-url http://minio:9000 presign s3://bucket/in.mp4 --expires-in 60"
        );
    }

    #[tokio::test]
    async fn test_presign_failure() {
        let err = storage("false", None)
            .presign("s3://bucket/in.mp4", Duration::from_secs(60))
            .await
            .unwrap_err();
        match err {
            FfstageError::Presign { url, .. } => assert_eq!(url, "s3://bucket/in.mp4"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_presign_missing_binary() {
        let err = storage("/nonexistent/aws", None)
            .presign("s3://bucket/in.mp4", Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, FfstageError::Presign { .. }));
    }

    #[tokio::test]
    async fn test_sync_and_copy_status() {
        let dir = tempfile::tempdir().unwrap();
        let ok = storage("true", None);
        tokio_test::assert_ok!(ok.sync(dir.path(), "s3://bucket/show/").await);
        tokio_test::assert_ok!(ok.copy(dir.path(), "s3://bucket/pkg/", true).await);

        let failing = storage("false", None);
        assert!(matches!(
            failing.sync(dir.path(), "s3://bucket/show/").await,
            Err(FfstageError::Sync(_))
        ));
        assert!(matches!(
            failing.copy(&dir.path().join("out.mp4"), "s3://bucket/out.mp4", false).await,
            Err(FfstageError::Upload(_))
        ));
    }
}
