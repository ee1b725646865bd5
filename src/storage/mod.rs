//! Byte access and folder listing over local disk and S3-compatible stores.

pub mod local;
pub mod location;
pub mod s3;

pub use location::Location;
pub use s3::S3Config;

use glob::Pattern;

use crate::error::{Result, TilesError};

/// Percent-encodes each segment of a `/`-separated path, keeping the
/// separators.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Dispatches reads, existence checks and listings to the backend selected
/// by a `Location`'s variant.
#[derive(Debug, Clone, Default)]
pub struct Storage {
    s3: S3Config,
}

impl Storage {
    pub fn new(s3: S3Config) -> Storage {
        Storage { s3 }
    }

    /// Reads the whole object. Any failure to read is reported as `NotFound`.
    pub fn read(&self, location: &Location) -> Result<Vec<u8>> {
        match location {
            Location::Local(path) => local::read(path),
            Location::S3 { bucket, key } => s3::read(&self.s3, bucket, key),
        }
    }

    pub fn exists(&self, location: &Location) -> bool {
        match location {
            Location::Local(path) => local::exists(path),
            Location::S3 { bucket, key } => s3::exists(&self.s3, bucket, key),
        }
    }

    /// Lists files under `root` whose name matches the shell wildcard
    /// `pattern` (`*`, `?`, `[abc]`, `[!a-z]`).
    pub fn list(&self, root: &Location, pattern: &str, recursive: bool) -> Result<Vec<Location>> {
        let pattern = Pattern::new(pattern).map_err(|_| TilesError::InvalidOption {
            name: "pattern",
            value: pattern.to_owned(),
        })?;
        let entries: Vec<Location> = match root {
            Location::Local(dir) => local::list(dir, recursive)?
                .into_iter()
                .map(Location::Local)
                .collect(),
            Location::S3 { bucket, key } => s3::list(&self.s3, bucket, key, recursive)?
                .into_iter()
                .map(|key| Location::S3 {
                    bucket: bucket.clone(),
                    key,
                })
                .collect(),
        };
        Ok(entries
            .into_iter()
            .filter(|loc| pattern.matches(loc.file_name()))
            .collect())
    }
}
