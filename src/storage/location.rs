use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, TilesError};

/// Where an image (or a folder of images) lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    Local(PathBuf),
    /// An object (or key prefix) in an S3-compatible bucket.
    S3 { bucket: String, key: String },
}

impl Location {
    /// Parses `s3://bucket/key` or a filesystem path.
    ///
    /// Other URI schemes (`gs://`, `http://`, ...) are rejected.
    pub fn parse(raw: &str) -> Result<Location> {
        if let Some(rest) = raw.strip_prefix("s3://") {
            let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
            if bucket.is_empty() {
                return Err(TilesError::InvalidLocation(format!("missing bucket in '{}'", raw)));
            }
            return Ok(Location::S3 {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
            });
        }
        if let Some(pos) = raw.find("://") {
            return Err(TilesError::InvalidLocation(format!(
                "no storage backend for scheme '{}'",
                &raw[..pos]
            )));
        }
        Ok(Location::Local(PathBuf::from(raw)))
    }

    /// Resolves a `/`-separated relative path below this location.
    pub fn join(&self, relative: &str) -> Location {
        let relative = relative.trim_start_matches('/');
        match self {
            Location::Local(dir) => Location::Local(dir.join(relative)),
            Location::S3 { bucket, key } => {
                let key = if key.is_empty() || key.ends_with('/') {
                    format!("{}{}", key, relative)
                } else {
                    format!("{}/{}", key, relative)
                };
                Location::S3 {
                    bucket: bucket.clone(),
                    key,
                }
            }
        }
    }

    /// Path of `self` relative to `root`, `/`-separated, if `self` is below it.
    pub fn relative_to(&self, root: &Location) -> Option<String> {
        match (self, root) {
            (Location::Local(path), Location::Local(dir)) => {
                let rel = path.strip_prefix(dir).ok()?;
                let parts: Vec<String> = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                Some(parts.join("/"))
            }
            (
                Location::S3 { bucket, key },
                Location::S3 {
                    bucket: root_bucket,
                    key: root_key,
                },
            ) if bucket == root_bucket => {
                let rest = key.strip_prefix(root_key.as_str())?;
                Some(rest.trim_start_matches('/').to_owned())
            }
            _ => None,
        }
    }

    /// Final path segment (file name or object name).
    pub fn file_name(&self) -> &str {
        match self {
            Location::Local(path) => path.file_name().and_then(|s| s.to_str()).unwrap_or(""),
            Location::S3 { key, .. } => key.rsplit('/').next().unwrap_or(""),
        }
    }

    /// Lower-cased extension without the dot.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        Path::new(name)
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local(path) => write!(f, "{}", path.display()),
            Location::S3 { bucket, key } => write!(f, "s3://{}/{}", bucket, key),
        }
    }
}
