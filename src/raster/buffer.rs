use ndarray::{concatenate, Array3, Axis};

use crate::raster::SampleFormat;

/// A decoded image: a dense (row, column, channel) array plus the sample type
/// it was stored as.
///
/// The channel count is whatever the source file held; 1, 3, 4 or any number
/// of spectral bands.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    data: Array3<f32>,
    sample: SampleFormat,
}

impl ImageBuffer {
    pub fn new(data: Array3<f32>, sample: SampleFormat) -> ImageBuffer {
        ImageBuffer { data, sample }
    }

    /// Builds a buffer from row-major, channel-interleaved samples.
    ///
    /// Returns `None` when `samples.len()` is not `height * width * channels`.
    pub fn from_interleaved(
        height: usize,
        width: usize,
        channels: usize,
        samples: Vec<f32>,
        sample: SampleFormat,
    ) -> Option<ImageBuffer> {
        Array3::from_shape_vec((height, width, channels), samples)
            .ok()
            .map(|data| ImageBuffer { data, sample })
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    pub fn sample_format(&self) -> SampleFormat {
        self.sample
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// Appends the channels of `other` after this buffer's channels.
    ///
    /// Both buffers must have the same height and width; returns `false` and
    /// leaves `self` untouched otherwise.
    pub fn append_bands(&mut self, other: &ImageBuffer) -> bool {
        if self.data.dim().0 != other.data.dim().0 || self.data.dim().1 != other.data.dim().1 {
            return false;
        }
        match concatenate(Axis(2), &[self.data.view(), other.data.view()]) {
            Ok(stacked) => {
                self.data = stacked;
                true
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_interleaved_shape() {
        let buf = ImageBuffer::from_interleaved(2, 3, 4, vec![0.0; 24], SampleFormat::U16).unwrap();
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.width(), 3);
        assert_eq!(buf.channels(), 4);
        assert_eq!(buf.sample_format(), SampleFormat::U16);
    }

    #[test]
    fn test_from_interleaved_rejects_bad_length() {
        assert!(ImageBuffer::from_interleaved(2, 3, 4, vec![0.0; 23], SampleFormat::U8).is_none());
    }

    #[test]
    fn test_append_bands() {
        let mut a = ImageBuffer::new(Array3::from_elem((2, 2, 1), 1.0), SampleFormat::U16);
        let b = ImageBuffer::new(Array3::from_elem((2, 2, 2), 2.0), SampleFormat::U16);
        assert!(a.append_bands(&b));
        assert_eq!(a.channels(), 3);
        assert_eq!(a.data()[[1, 1, 0]], 1.0);
        assert_eq!(a.data()[[1, 1, 2]], 2.0);

        let odd = ImageBuffer::new(Array3::from_elem((3, 2, 1), 0.0), SampleFormat::U16);
        assert!(!a.append_bands(&odd));
        assert_eq!(a.channels(), 3);
    }
}
