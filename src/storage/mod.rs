// Object storage access
//
// The crate never talks to S3 directly; it drives a storage CLI through the
// ObjectStorageTrait seam:
// - AwsCli: `aws s3 presign|sync|cp`, with an optional endpoint override

pub mod aws_cli;

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

pub use aws_cli::AwsCliStorage;

use crate::config::StorageConfig;
use crate::error::Result;

/// Operations the resolver and reconciler need from object storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorageTrait: Send + Sync {
    /// Produce a time-limited signed URL for an s3:// object
    async fn presign(&self, url: &str, expires_in: Duration) -> Result<String>;

    /// Mirror a local directory tree onto a remote prefix
    async fn sync(&self, local_dir: &Path, remote_prefix: &str) -> Result<()>;

    /// Copy a local file, or a directory when `recursive` is set, to a remote location
    async fn copy(&self, local_path: &Path, remote: &str, recursive: bool) -> Result<()>;
}

/// Factory for creating storage instances
pub struct StorageFactory;

impl StorageFactory {
    /// Create the default storage implementation (aws CLI)
    pub fn create_storage(config: StorageConfig) -> Box<dyn ObjectStorageTrait> {
        Box::new(AwsCliStorage::new(config))
    }
}
