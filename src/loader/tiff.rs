//! Multi-band TIFF decoder.
//!
//! The first page sets the image size. Every later page with the same size
//! is appended as extra bands, which is how band-per-page satellite products
//! are laid out; overview and thumbnail pages of other sizes are skipped.

use std::io::Cursor;

use ::tiff::decoder::{Decoder, DecodingResult, Limits};

use crate::error::{Result, TilesError};
use crate::raster::{ImageBuffer, SampleFormat};

macro_rules! widen {
    ($v:expr, $fmt:expr) => {
        ($v.into_iter().map(|x| x as f32).collect::<Vec<f32>>(), $fmt)
    };
}

fn page_samples(result: DecodingResult) -> Option<(Vec<f32>, SampleFormat)> {
    #[allow(unreachable_patterns)]
    let converted = match result {
        DecodingResult::U8(v) => widen!(v, SampleFormat::U8),
        DecodingResult::U16(v) => widen!(v, SampleFormat::U16),
        DecodingResult::U32(v) => widen!(v, SampleFormat::U32),
        DecodingResult::U64(v) => widen!(v, SampleFormat::U64),
        DecodingResult::I8(v) => widen!(v, SampleFormat::I8),
        DecodingResult::I16(v) => widen!(v, SampleFormat::I16),
        DecodingResult::I32(v) => widen!(v, SampleFormat::I32),
        DecodingResult::I64(v) => widen!(v, SampleFormat::I64),
        DecodingResult::F32(v) => (v, SampleFormat::F32),
        DecodingResult::F64(v) => widen!(v, SampleFormat::F64),
        _ => return None,
    };
    Some(converted)
}

fn read_page<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
    width: usize,
    height: usize,
    location: &str,
) -> Result<ImageBuffer> {
    let result = decoder
        .read_image()
        .map_err(|e| TilesError::decode(location, e))?;
    let (samples, sample) = page_samples(result)
        .ok_or_else(|| TilesError::decode(location, "unsupported TIFF sample type"))?;

    let pixels = width * height;
    if pixels == 0 || samples.len() % pixels != 0 {
        return Err(TilesError::decode(
            location,
            format!("{} samples do not fill a {}x{} page", samples.len(), width, height),
        ));
    }
    let channels = samples.len() / pixels;

    ImageBuffer::from_interleaved(height, width, channels, samples, sample)
        .ok_or_else(|| TilesError::decode(location, "page shape mismatch"))
}

pub fn decode(data: &[u8], location: &str) -> Result<ImageBuffer> {
    let mut decoder = Decoder::new(Cursor::new(data))
        .map_err(|e| TilesError::decode(location, e))?
        .with_limits(Limits::unlimited());

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| TilesError::decode(location, e))?;
    let (width, height) = (width as usize, height as usize);

    let mut buffer = read_page(&mut decoder, width, height, location)?;
    let mut pages = 1;

    while decoder.more_images() {
        decoder
            .next_image()
            .map_err(|e| TilesError::decode(location, e))?;
        let (w, h) = decoder
            .dimensions()
            .map_err(|e| TilesError::decode(location, e))?;
        if (w as usize, h as usize) != (width, height) {
            log::trace!("{}: skipping {}x{} page", location, w, h);
            continue;
        }
        let page = read_page(&mut decoder, width, height, location)?;
        if buffer.append_bands(&page) {
            pages += 1;
        }
    }

    log::debug!(
        "tiff decoder: {} is {}x{} with {} bands from {} page(s)",
        location,
        width,
        height,
        buffer.channels(),
        pages
    );
    Ok(buffer)
}
