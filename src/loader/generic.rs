//! Decoder for consumer formats (PNG, JPEG, GIF, BMP, WebP) via the `image` crate.

use image::{DynamicImage, ImageFormat};

use crate::error::{Result, TilesError};
use crate::raster::{ImageBuffer, SampleFormat};

fn widen<T: Copy + Into<f32>>(raw: Vec<T>) -> Vec<f32> {
    raw.into_iter().map(Into::into).collect()
}

/// Decodes `data` keeping the file's own channel count and sample depth.
pub fn decode(data: &[u8], format: ImageFormat, location: &str) -> Result<ImageBuffer> {
    let img = image::load_from_memory_with_format(data, format)
        .map_err(|e| TilesError::decode(location, e))?;

    let width = img.width() as usize;
    let height = img.height() as usize;

    let (channels, samples, sample) = match img {
        DynamicImage::ImageLuma8(b) => (1, widen(b.into_raw()), SampleFormat::U8),
        DynamicImage::ImageLumaA8(b) => (2, widen(b.into_raw()), SampleFormat::U8),
        DynamicImage::ImageRgb8(b) => (3, widen(b.into_raw()), SampleFormat::U8),
        DynamicImage::ImageRgba8(b) => (4, widen(b.into_raw()), SampleFormat::U8),
        DynamicImage::ImageLuma16(b) => (1, widen(b.into_raw()), SampleFormat::U16),
        DynamicImage::ImageLumaA16(b) => (2, widen(b.into_raw()), SampleFormat::U16),
        DynamicImage::ImageRgb16(b) => (3, widen(b.into_raw()), SampleFormat::U16),
        DynamicImage::ImageRgba16(b) => (4, widen(b.into_raw()), SampleFormat::U16),
        DynamicImage::ImageRgb32F(b) => (3, b.into_raw(), SampleFormat::F32),
        DynamicImage::ImageRgba32F(b) => (4, b.into_raw(), SampleFormat::F32),
        other => (4, other.to_rgba32f().into_raw(), SampleFormat::F32),
    };

    log::trace!(
        "generic decoder: {}x{} with {} channels ({:?})",
        width,
        height,
        channels,
        sample
    );

    ImageBuffer::from_interleaved(height, width, channels, samples, sample)
        .ok_or_else(|| TilesError::decode(location, "pixel count does not match dimensions"))
}
