use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::task::JoinSet;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::command::Location;
use crate::error::{FfstageError, Result};
use crate::resolver::{Destination, SegmentPattern};
use crate::staging::StagingDir;
use crate::storage::ObjectStorageTrait;

/// What reconciliation did with the staged output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// Whole staging tree mirrored to the HLS base prefix
    Synced { prefix: String, files: usize },
    /// Entries moved to a local destination
    Moved { paths: Vec<PathBuf> },
    /// Whole staging directory copied under a remote prefix
    UploadedDirectory { prefix: String },
    /// Single file uploaded
    Uploaded { target: String },
}

/// Projects a staging directory onto the declared destination
pub struct Reconciler<'a> {
    storage: &'a dyn ObjectStorageTrait,
}

impl<'a> Reconciler<'a> {
    pub fn new(storage: &'a dyn ObjectStorageTrait) -> Self {
        Self { storage }
    }

    /// Move or upload staged output to `destination`.
    ///
    /// Nothing already moved is rolled back when a later step fails.
    pub async fn reconcile(
        &self,
        destination: &Destination,
        staging: &StagingDir,
        segment_pattern: Option<&SegmentPattern>,
    ) -> Result<ReconcileOutcome> {
        if let (Some(pattern), true) = (segment_pattern, destination.location.is_object_store()) {
            return self.sync_segments(pattern, staging).await;
        }

        match &destination.location {
            Location::Local { path, directory_style: true } => {
                move_all(staging, path).await
            }
            Location::Local { path, directory_style: false } => {
                let file = find_staged_file(staging, &destination.location).await?;
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).await?;
                }
                let moved = move_path(file, path.clone()).await?;
                info!("Moved output to {}", moved.display());
                Ok(ReconcileOutcome::Moved { paths: vec![moved] })
            }
            Location::ObjectStore { .. } if destination.location.is_directory_style() => {
                let prefix = destination.location.to_string();
                self.storage.copy(staging.path(), &prefix, true).await?;
                info!("Uploaded package to {}", prefix);
                Ok(ReconcileOutcome::UploadedDirectory { prefix })
            }
            Location::ObjectStore { .. } => {
                let file = find_staged_file(staging, &destination.location).await?;
                let target = destination.location.to_string();
                self.storage.copy(&file, &target, false).await?;
                Ok(ReconcileOutcome::Uploaded { target })
            }
            Location::Unsupported { scheme } => {
                Err(FfstageError::UnsupportedScheme(scheme.clone()))
            }
        }
    }

    async fn sync_segments(
        &self,
        pattern: &SegmentPattern,
        staging: &StagingDir,
    ) -> Result<ReconcileOutcome> {
        let prefix = pattern.sync_prefix();
        let files = staging.staged_files();
        info!("Syncing HLS output ({} files) to {}", files.len(), prefix);
        for file in &files {
            debug!("  {}", file.display());
        }

        self.storage.sync(staging.path(), &prefix).await?;
        Ok(ReconcileOutcome::Synced { prefix, files: files.len() })
    }
}

/// The top-level staged entry named like the destination's final component
async fn find_staged_file(staging: &StagingDir, location: &Location) -> Result<PathBuf> {
    let name = location.file_name().unwrap_or_default();
    staging
        .staged_entries()
        .await?
        .into_iter()
        .find(|entry| entry.file_name().is_some_and(|f| f.to_string_lossy() == name))
        .ok_or(FfstageError::OutputNotFound(name))
}

/// Move every top-level staged entry into `dir`, concurrently
async fn move_all(staging: &StagingDir, dir: &Path) -> Result<ReconcileOutcome> {
    fs::create_dir_all(dir).await?;

    let mut moves = JoinSet::new();
    for entry in staging.staged_entries().await? {
        let Some(name) = entry.file_name().map(|n| n.to_owned()) else {
            continue;
        };
        moves.spawn(move_path(entry, dir.join(name)));
    }

    let mut paths = Vec::new();
    while let Some(joined) = moves.join_next().await {
        let moved = joined.map_err(io::Error::other)??;
        debug!("Moved {}", moved.display());
        paths.push(moved);
    }
    paths.sort();

    info!("Moved {} entries to {}", paths.len(), dir.display());
    Ok(ReconcileOutcome::Moved { paths })
}

/// Rename, falling back to copy-and-delete across filesystems
async fn move_path(source: PathBuf, target: PathBuf) -> Result<PathBuf> {
    match fs::rename(&source, &target).await {
        Ok(()) => Ok(target),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!("{} is on another device, copying", target.display());
            copy_then_remove(&source, &target).await?;
            Ok(target)
        }
        Err(e) => Err(e.into()),
    }
}

/// The source is only removed once every entry has been copied
async fn copy_then_remove(source: &Path, target: &Path) -> Result<()> {
    if fs::metadata(source).await?.is_dir() {
        copy_tree(source, target).await?;
        fs::remove_dir_all(source).await?;
    } else {
        fs::copy(source, target).await?;
        fs::remove_file(source).await?;
    }
    Ok(())
}

async fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(io::Error::from)?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let destination = target.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination).await?;
        } else {
            fs::copy(entry.path(), &destination).await?;
        }
    }
    Ok(())
}
