use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::command::{
    Classification, Location, ReplacementTable, OBJECT_STORE_SCHEME, VARIANT_PLACEHOLDER,
};
use crate::error::Result;
use crate::storage::ObjectStorageTrait;

const DEFAULT_SEGMENT_NAME: &str = "segment_%03d.ts";
const DEFAULT_STAGED_NAME: &str = "output";

/// HLS segment naming template found in the command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentPattern {
    /// The s3:// literal as written in the command
    pub original: String,
    /// Path relative to the staging directory that replaces it
    pub local: String,
}

impl SegmentPattern {
    pub fn from_literal(literal: &str) -> Self {
        Self {
            original: literal.to_string(),
            local: staged_relative_path(literal, DEFAULT_SEGMENT_NAME),
        }
    }

    /// Remote prefix the whole staging tree is synced to.
    ///
    /// Drops the filename template and, for variant patterns, the variant
    /// directory as well: `s3://b/show/stream_%v/seg_%03d.ts` -> `s3://b/show/`.
    pub fn sync_prefix(&self) -> String {
        let mut prefix = match self.original.rfind('/') {
            Some(i) => &self.original[..=i],
            None => self.original.as_str(),
        };

        if prefix.contains(VARIANT_PLACEHOLDER) {
            let without_slash = &prefix[..prefix.len().saturating_sub(1)];
            if let Some(i) = without_slash.rfind('/') {
                prefix = &prefix[..=i];
            }
        }

        prefix.to_string()
    }
}

/// The untouched output reference, kept for reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destination {
    pub literal: String,
    pub location: Location,
}

/// Everything the rewriter and reconciler need from resolution
#[derive(Debug, Clone)]
pub struct Resolution {
    pub replacements: ReplacementTable,
    pub segment_pattern: Option<SegmentPattern>,
    pub output_index: usize,
    pub local_output: PathBuf,
    pub destination: Destination,
}

impl Resolution {
    pub fn is_segmented(&self) -> bool {
        self.segment_pattern.is_some()
    }
}

/// Turns remote references into presigned URLs or staging paths
pub struct Resolver<'a> {
    storage: &'a dyn ObjectStorageTrait,
    presign_expiry: Duration,
}

impl<'a> Resolver<'a> {
    pub fn new(storage: &'a dyn ObjectStorageTrait, presign_expiry: Duration) -> Self {
        Self { storage, presign_expiry }
    }

    /// Resolve every remote token of a classified command.
    ///
    /// Whether the job is segmented is settled before any other token is
    /// looked at: with a segment pattern every remote output stages locally,
    /// without one remote tokens are presigned and accessed directly.
    pub async fn resolve(
        &self,
        tokens: &[String],
        classification: &Classification,
        staging_dir: &Path,
    ) -> Result<Resolution> {
        let segment_pattern = classification
            .segment_pattern
            .map(|i| SegmentPattern::from_literal(&tokens[i]));

        let input = &tokens[classification.input];
        let output = &tokens[classification.output];
        let mut replacements = ReplacementTable::new();

        if let Some(pattern) = &segment_pattern {
            debug!("Segment pattern {} staged as {}", pattern.original, pattern.local);
            replacements.insert(pattern.original.as_str(), pattern.local.as_str());
        }

        if input.starts_with(OBJECT_STORE_SCHEME) && !replacements.contains(input) {
            let signed = self.storage.presign(input, self.presign_expiry).await?;
            replacements.insert(input.as_str(), signed);
        }

        for token in tokens {
            if !token.starts_with(OBJECT_STORE_SCHEME)
                || token == input
                || token == output
                || replacements.contains(token)
            {
                continue;
            }

            let resolved = if segment_pattern.is_some() {
                staged_relative_path(token, DEFAULT_STAGED_NAME)
            } else {
                self.storage.presign(token, self.presign_expiry).await?
            };
            replacements.insert(token.as_str(), resolved);
        }

        let location = Location::parse(output);
        let relative = match &segment_pattern {
            Some(pattern) if location.is_object_store() => {
                if pattern.original == *output {
                    pattern.local.clone()
                } else {
                    staged_relative_path(output, DEFAULT_STAGED_NAME)
                }
            }
            _ => location.file_name().unwrap_or_default(),
        };
        let local_output = if relative.is_empty() {
            staging_dir.to_path_buf()
        } else {
            staging_dir.join(&relative)
        };

        debug!("Output token {}", output);
        debug!("Output staged at {}", local_output.display());

        Ok(Resolution {
            replacements,
            segment_pattern,
            output_index: classification.output,
            local_output,
            destination: Destination {
                literal: output.clone(),
                location,
            },
        })
    }
}

/// Local name for a remote reference that is staged instead of presigned.
///
/// Variant references keep their variant directory (`stream_%v/file`) so the
/// per-variant layout survives; everything else keeps only its filename.
fn staged_relative_path(literal: &str, fallback: &str) -> String {
    let relative = match Location::parse(literal) {
        Location::ObjectStore { key, .. } if literal.contains(VARIANT_PLACEHOLDER) => {
            let parts: Vec<&str> = key.split('/').collect();
            let start = parts.len().saturating_sub(2);
            parts[start..].join("/")
        }
        _ => literal.rsplit('/').next().unwrap_or_default().to_string(),
    };

    if relative.is_empty() {
        fallback.to_string()
    } else {
        relative
    }
}
