//! Channel selection, normalization and re-encoding of decoded images.

pub mod mode;
pub mod normalization;

pub use mode::RenderMode;
pub use normalization::Normalization;

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::error::{ParameterError, ParameterErrorKind};
use image::{DynamicImage, ImageError, ImageOutputFormat, RgbImage};
use ndarray::Array3;
use serde::Serialize;

use crate::error::{Result, TilesError};
use crate::raster::ImageBuffer;

/// JPEG quality used for `OutputFormat::Jpeg`.
const JPEG_QUALITY: u8 = 90;

/// Encoding of the bytes sent to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = TilesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            _ => Err(TilesError::InvalidOption {
                name: "format",
                value: s.to_owned(),
            }),
        }
    }
}

/// Per-request rendering choices. The server builds one from its configured
/// defaults and the request's query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RenderOptions {
    pub render_mode: RenderMode,
    pub normalization: Normalization,
    pub output: OutputFormat,
}

/// Selects channels and normalizes; the result is `(H, W, 3)` with every
/// element in `0..=255`.
pub fn render_pixels(
    buffer: &ImageBuffer,
    mode: RenderMode,
    normalization: Normalization,
) -> Result<Array3<u8>> {
    let planes = mode.apply(buffer)?;
    normalization.apply(&planes, buffer.sample_format())
}

/// Encodes a `(H, W, 3)` array as PNG or JPEG.
pub fn encode(pixels: &Array3<u8>, format: OutputFormat) -> Result<Vec<u8>> {
    let (height, width, channels) = pixels.dim();
    let img = (channels == 3)
        .then(|| RgbImage::from_raw(width as u32, height as u32, pixels.iter().copied().collect()))
        .flatten()
        .ok_or_else(|| {
            ImageError::Parameter(ParameterError::from_kind(ParameterErrorKind::DimensionMismatch))
        })?;

    let output = match format {
        OutputFormat::Png => ImageOutputFormat::Png,
        OutputFormat::Jpeg => ImageOutputFormat::Jpeg(JPEG_QUALITY),
    };
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut bytes, output)?;
    Ok(bytes.into_inner())
}

/// Full renderer: channel selection, normalization, encoding.
pub fn render(buffer: &ImageBuffer, options: &RenderOptions) -> Result<Vec<u8>> {
    let pixels = render_pixels(buffer, options.render_mode, options.normalization)?;
    encode(&pixels, options.output)
}
