use serde::Serialize;
use std::fmt;
use std::path::{PathBuf, MAIN_SEPARATOR};
use url::Url;

/// Prefix identifying object-store references
pub const OBJECT_STORE_SCHEME: &str = "s3://";

/// ffmpeg's per-variant placeholder in HLS output names
pub const VARIANT_PLACEHOLDER: &str = "%v";

/// A location referenced by a command token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    /// Plain path or file:// URL
    Local { path: PathBuf, directory_style: bool },
    /// s3://bucket/key
    ObjectStore { bucket: String, key: String },
    /// Any other scheme; accepted in a command but never reconciled
    Unsupported { scheme: String },
}

impl Location {
    pub fn parse(token: &str) -> Self {
        if let Some(rest) = token.strip_prefix(OBJECT_STORE_SCHEME) {
            let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
            return Location::ObjectStore {
                bucket: bucket.to_string(),
                key: key.to_string(),
            };
        }

        match url_scheme(token) {
            Some("file") => match Url::parse(token) {
                Ok(url) => {
                    let directory_style = url.path().ends_with('/');
                    let path = url
                        .to_file_path()
                        .unwrap_or_else(|_| PathBuf::from(url.path()));
                    Location::Local { path, directory_style }
                }
                Err(_) => Location::Unsupported { scheme: "file".to_string() },
            },
            Some(scheme) => Location::Unsupported { scheme: scheme.to_string() },
            None => Location::Local {
                path: PathBuf::from(token),
                directory_style: token.ends_with('/') || token.ends_with(MAIN_SEPARATOR),
            },
        }
    }

    pub fn is_object_store(&self) -> bool {
        matches!(self, Location::ObjectStore { .. })
    }

    /// Whether the location names a directory/prefix rather than one file
    pub fn is_directory_style(&self) -> bool {
        match self {
            Location::Local { directory_style, .. } => *directory_style,
            Location::ObjectStore { key, .. } => key.is_empty() || key.ends_with('/'),
            Location::Unsupported { .. } => false,
        }
    }

    /// Final path component, if the location names a file
    pub fn file_name(&self) -> Option<String> {
        if self.is_directory_style() {
            return None;
        }
        match self {
            Location::Local { path, .. } => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            Location::ObjectStore { key, .. } => key
                .rsplit('/')
                .next()
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            Location::Unsupported { .. } => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local { path, .. } => write!(f, "{}", path.display()),
            Location::ObjectStore { bucket, key } => {
                write!(f, "{}{}/{}", OBJECT_STORE_SCHEME, bucket, key)
            }
            Location::Unsupported { scheme } => write!(f, "{}:", scheme),
        }
    }
}

/// Scheme of a `scheme://...` token; bare paths (including `C:\...`) have none
fn url_scheme(token: &str) -> Option<&str> {
    let (scheme, _) = token.split_once("://")?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        Some(scheme)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_store() {
        let location = Location::parse("s3://bucket/show/stream_%v/segment_%03d.ts");
        assert_eq!(
            location,
            Location::ObjectStore {
                bucket: "bucket".to_string(),
                key: "show/stream_%v/segment_%03d.ts".to_string(),
            }
        );
        assert_eq!(location.file_name().as_deref(), Some("segment_%03d.ts"));
        assert_eq!(location.to_string(), "s3://bucket/show/stream_%v/segment_%03d.ts");
        assert!(!location.is_directory_style());
    }

    #[test]
    fn test_object_store_prefix() {
        let location = Location::parse("s3://bucket/package/");
        assert!(location.is_directory_style());
        assert_eq!(location.file_name(), None);

        let bucket_only = Location::parse("s3://bucket");
        assert!(bucket_only.is_directory_style());
        assert_eq!(bucket_only.to_string(), "s3://bucket/");
    }

    #[test]
    fn test_parse_local_paths() {
        let file = Location::parse("out.mp4");
        assert_eq!(
            file,
            Location::Local { path: PathBuf::from("out.mp4"), directory_style: false }
        );
        assert_eq!(file.file_name().as_deref(), Some("out.mp4"));

        let dir = Location::parse("/videos/");
        assert!(dir.is_directory_style());
        assert_eq!(dir.file_name(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_parse_file_url() {
        let location = Location::parse("file:///videos/out.mp4");
        assert_eq!(
            location,
            Location::Local { path: PathBuf::from("/videos/out.mp4"), directory_style: false }
        );

        let dir = Location::parse("file:///videos/");
        assert!(dir.is_directory_style());
    }

    #[test]
    fn test_other_schemes_are_unsupported() {
        assert_eq!(
            Location::parse("gs://bucket/out.mp4"),
            Location::Unsupported { scheme: "gs".to_string() }
        );
        assert_eq!(
            Location::parse("https://cdn.example.com/out.mp4"),
            Location::Unsupported { scheme: "https".to_string() }
        );
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let unsupported = serde_json::to_value(Location::parse("gs://bucket/out.mp4")).unwrap();
        assert_eq!(unsupported, serde_json::json!({ "kind": "unsupported", "scheme": "gs" }));

        let remote = serde_json::to_value(Location::parse("s3://bucket/out.mp4")).unwrap();
        assert_eq!(
            remote,
            serde_json::json!({ "kind": "object_store", "bucket": "bucket", "key": "out.mp4" })
        );
    }
}
