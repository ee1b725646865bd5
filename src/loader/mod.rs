//! Reads an image from storage and decodes it into an `ImageBuffer`.
//!
//! Codec selection is a closed lookup, tried in this order:
//! 1. The explicit format hint, if given
//! 2. The file extension
//! 3. Magic bytes, for files with no or an unknown extension
//!
//! A hint that names no known codec fails before any bytes are read.

pub mod codec;
pub mod generic;
pub mod jp2;
pub mod tiff;

pub use codec::{is_supported_file, Codec};

use crate::error::{Result, TilesError};
use crate::raster::ImageBuffer;
use crate::storage::{Location, Storage};

/// Reads and decodes the image at `location`.
///
/// `hint` is an extension-like format name (`"tif"`, `"png"`, ...) that
/// overrides the file's own extension.
pub fn load(storage: &Storage, location: &Location, hint: Option<&str>) -> Result<ImageBuffer> {
    let declared = match hint {
        Some(name) => Some(Codec::from_extension(name).ok_or_else(|| {
            TilesError::unsupported(location, format!("no codec for hint '{}'", name))
        })?),
        None => location.extension().as_deref().and_then(Codec::from_extension),
    };

    let bytes = storage.read(location)?;

    let codec = match declared {
        Some(codec) => codec,
        None => Codec::sniff(&bytes)
            .ok_or_else(|| TilesError::unsupported(location, "unrecognized file contents"))?,
    };

    decode(&bytes, codec, &location.to_string())
}

/// Decodes in-memory bytes with a known codec.
pub fn decode(bytes: &[u8], codec: Codec, location: &str) -> Result<ImageBuffer> {
    log::debug!("Decoding {} with the {} codec", location, codec.name());
    match codec {
        Codec::Generic(format) => generic::decode(bytes, format, location),
        Codec::Tiff => tiff::decode(bytes, location),
        Codec::Jp2 => jp2::decode(bytes, location),
    }
}
