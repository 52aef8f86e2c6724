use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::Result;

/// Per-job working directory: `<root>/<job_id>/`
#[derive(Debug, Clone)]
pub struct StagingDir {
    job_id: String,
    path: PathBuf,
}

impl StagingDir {
    /// Create a fresh job directory under `root`.
    ///
    /// Fails rather than reuse a directory that already exists.
    pub async fn prepare<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root).await?;

        let job_id = Uuid::new_v4().simple().to_string();
        let path = root.join(&job_id);
        fs::create_dir(&path).await?;

        debug!("Created job directory {}", path.display());
        Ok(Self { job_id, path })
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Top-level entries, sorted by name
    pub async fn staged_entries(&self) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(&self.path).await?;
        while let Some(entry) = dir.next_entry().await? {
            entries.push(entry.path());
        }
        entries.sort();
        Ok(entries)
    }

    /// Every file in the tree, relative to the staging directory
    pub fn staged_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| pathdiff::diff_paths(e.path(), &self.path))
            .collect();
        files.sort();
        files
    }

    pub async fn cleanup(self) -> Result<()> {
        debug!("Removing staging directory {}", self.path.display());
        fs::remove_dir_all(&self.path).await?;
        Ok(())
    }
}
