//! JPEG 2000 decoder (OpenJPEG through `jpeg2k`), one band per component.

use crate::error::{Result, TilesError};
use crate::raster::ImageBuffer;

#[cfg(feature = "jp2")]
pub fn decode(data: &[u8], location: &str) -> Result<ImageBuffer> {
    use crate::raster::SampleFormat;
    use ndarray::Array3;

    let image = jpeg2k::Image::from_bytes(data).map_err(|e| TilesError::decode(location, e))?;
    let width = image.width() as usize;
    let height = image.height() as usize;
    let components = image.components();

    if components.is_empty() {
        return Err(TilesError::decode(location, "no image components"));
    }

    let mut data = Array3::<f32>::zeros((height, width, components.len()));
    let mut precision = 0;
    let mut signed = false;
    for (band, comp) in components.iter().enumerate() {
        if comp.width() as usize != width || comp.height() as usize != height {
            return Err(TilesError::decode(
                location,
                format!("component {} is subsampled", band),
            ));
        }
        precision = precision.max(comp.precision());
        signed |= comp.is_signed();
        for (i, value) in comp.data().iter().enumerate() {
            data[[i / width, i % width, band]] = *value as f32;
        }
    }

    let sample = match (precision, signed) {
        (0..=8, false) => SampleFormat::U8,
        (0..=8, true) => SampleFormat::I8,
        (9..=16, false) => SampleFormat::U16,
        (9..=16, true) => SampleFormat::I16,
        (_, false) => SampleFormat::U32,
        (_, true) => SampleFormat::I32,
    };

    log::debug!(
        "jp2 decoder: {} is {}x{} with {} bands ({} bit)",
        location,
        width,
        height,
        components.len(),
        precision
    );
    Ok(ImageBuffer::new(data, sample))
}

#[cfg(not(feature = "jp2"))]
pub fn decode(_data: &[u8], location: &str) -> Result<ImageBuffer> {
    Err(TilesError::unsupported(
        location,
        "JPEG 2000 support is not compiled in (enable the `jp2` feature)",
    ))
}
