use std::fmt;
use std::str::FromStr;

use ndarray::{Array3, Axis, Zip};
use serde::Serialize;

use crate::error::{Result, TilesError};
use crate::raster::SampleFormat;

/// Contrast of the sigmoid stretch (xarray-spatial `true_color`).
pub const SIGMOID_CONTRAST: f64 = 10.0;
/// Brightness threshold of the sigmoid stretch (xarray-spatial `true_color`).
pub const SIGMOID_THRESHOLD: f64 = 0.125;

/// Digital number shown as full white. Sentinel-2 L2A stores reflectance
/// times 10000, and the true colour image (TCI) product saturates at
/// reflectance 0.2.
pub const SENTINEL_SATURATION: f64 = 2_000.0;

const MAX_PIXEL: f64 = 255.0;

/// Maps arbitrary sample ranges to 8-bit display values.
///
/// - `Standard`: pass 8-bit 1- or 3-channel data through, otherwise `Scaling`.
/// - `Scaling`:  clip at 0 and divide by the observed maximum.
/// - `Sigmoid`:  min/max stretch followed by a sigmoid contrast curve.
/// - `Sentinel`: Sentinel-2 TCI reflectance mapping; saturated pixels go white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    #[default]
    Standard,
    Scaling,
    Sigmoid,
    Sentinel,
}

impl Normalization {
    pub const ALL: [Normalization; 4] = [
        Normalization::Standard,
        Normalization::Scaling,
        Normalization::Sigmoid,
        Normalization::Sentinel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Normalization::Standard => "standard",
            Normalization::Scaling => "scaling",
            Normalization::Sigmoid => "sigmoid",
            Normalization::Sentinel => "sentinel",
        }
    }

    /// Converts `planes` to 8 bits. `source` is the sample type the pixels
    /// were decoded from.
    pub fn apply(self, planes: &Array3<f32>, source: SampleFormat) -> Result<Array3<u8>> {
        let channels = planes.dim().2;
        if channels == 0 {
            return Err(TilesError::normalization(self.name(), "image has no channels"));
        }

        match self {
            Normalization::Standard => {
                if (channels == 1 || channels == 3) && source.is_display_range() {
                    Ok(planes.mapv(|v| to_u8(v as f64)))
                } else {
                    scaling(planes)
                }
            }
            Normalization::Scaling => scaling(planes),
            Normalization::Sigmoid => sigmoid(planes, SIGMOID_CONTRAST, SIGMOID_THRESHOLD),
            Normalization::Sentinel => sentinel_true_color(planes),
        }
    }
}

/// Truncating cast into the display range; NaN becomes 0.
fn to_u8(v: f64) -> u8 {
    if v.is_nan() {
        0
    } else {
        v.clamp(0.0, MAX_PIXEL) as u8
    }
}

/// Clips values at or below zero, then rescales so the largest finite value
/// becomes 255. An image with no positive values comes out black.
pub fn scaling(planes: &Array3<f32>) -> Result<Array3<u8>> {
    let max = planes
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, &v| {
            let v = (v as f64).max(0.0);
            Some(acc.map_or(v, |m| m.max(v)))
        })
        .ok_or_else(|| TilesError::normalization("scaling", "image has no finite values"))?;

    if max == 0.0 {
        return Ok(Array3::zeros(planes.dim()));
    }
    Ok(planes.mapv(|v| {
        let v = v as f64;
        if v <= 0.0 {
            0
        } else {
            to_u8(v / max * MAX_PIXEL)
        }
    }))
}

/// Sigmoid contrast stretch:
/// `(1 / (1 + exp(contrast * (threshold - (x - min) / range)))) * 255`
/// with `range = max(max - min, 1)` over the finite values.
pub fn sigmoid(planes: &Array3<f32>, contrast: f64, threshold: f64) -> Result<Array3<u8>> {
    let (min, max) = planes
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, &v| {
            let v = v as f64;
            Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
        })
        .ok_or_else(|| TilesError::normalization("sigmoid", "image has no finite values"))?;
    let range = (max - min).max(1.0);

    Ok(planes.mapv(|v| {
        if v.is_nan() {
            return 0;
        }
        let norm = (v as f64 - min) / range;
        to_u8((1.0 / (1.0 + (contrast * (threshold - norm)).exp())) * MAX_PIXEL)
    }))
}

/// Sentinel-2 true colour mapping for a 3-band reflectance stack.
///
/// Digital numbers are scaled so `SENTINEL_SATURATION` maps to 255; a pixel
/// above saturation in any band is drawn white.
pub fn sentinel_true_color(planes: &Array3<f32>) -> Result<Array3<u8>> {
    let channels = planes.dim().2;
    if channels != 3 {
        return Err(TilesError::normalization(
            "sentinel",
            format!("expected a 3 channel RGB stack, got {} channels", channels),
        ));
    }

    let mut out = Array3::<u8>::zeros(planes.dim());
    Zip::from(out.lanes_mut(Axis(2)))
        .and(planes.lanes(Axis(2)))
        .for_each(|mut dst, src| {
            let saturated = src.iter().any(|&v| v as f64 > SENTINEL_SATURATION);
            for (d, &s) in dst.iter_mut().zip(src.iter()) {
                *d = if saturated {
                    u8::MAX
                } else {
                    to_u8(s as f64 / SENTINEL_SATURATION * MAX_PIXEL)
                };
            }
        });
    Ok(out)
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Normalization {
    type Err = TilesError;

    fn from_str(s: &str) -> Result<Self> {
        Normalization::ALL
            .into_iter()
            .find(|n| n.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TilesError::InvalidOption {
                name: "normalization_mode",
                value: s.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::s;

    /// `np.arange(16 * 16 * 3).reshape((16, 16, 3))`
    fn arange() -> Array3<f32> {
        Array3::from_shape_vec((16, 16, 3), (0..768).map(|v| v as f32).collect()).unwrap()
    }

    fn total(a: &Array3<u8>) -> u64 {
        a.iter().map(|&v| v as u64).sum()
    }

    #[test]
    fn test_scaling_reference_sum() {
        let normed = scaling(&arange()).unwrap();
        assert_eq!(total(&normed), 97537);
        assert_eq!(normed.iter().max(), Some(&255));
    }

    #[test]
    fn test_scaling_clips_negative_and_hits_max() {
        let mut planes = Array3::<f32>::zeros((1, 3, 3));
        planes[[0, 0, 0]] = -500.0;
        planes[[0, 1, 1]] = 1234.0;
        planes[[0, 2, 2]] = 617.0;
        let normed = scaling(&planes).unwrap();
        assert_eq!(normed[[0, 0, 0]], 0);
        assert_eq!(normed[[0, 1, 1]], 255);
        assert_eq!(normed[[0, 2, 2]], 127);
    }

    #[test]
    fn test_scaling_all_negative_is_black() {
        let planes = Array3::<f32>::from_elem((2, 2, 3), -3.0);
        assert_eq!(total(&scaling(&planes).unwrap()), 0);
    }

    #[test]
    fn test_standard_passes_8bit_through() {
        let planes = arange().mapv(|v| (v as u32 % 256) as f32);
        let normed = Normalization::Standard.apply(&planes, SampleFormat::U8).unwrap();
        assert_eq!(normed, planes.mapv(|v| v as u8));
    }

    #[test]
    fn test_standard_scales_wide_data() {
        // Float ones are not 8-bit data, so they are scaled up to white.
        let ones = Array3::<f32>::ones((16, 16, 3));
        let normed = Normalization::Standard.apply(&ones, SampleFormat::F64).unwrap();
        assert_eq!(total(&normed), 16 * 16 * 3 * 255);

        let normed = Normalization::Standard.apply(&arange(), SampleFormat::I64).unwrap();
        assert_eq!(total(&normed), 97537);
    }

    #[test]
    fn test_standard_scales_four_channel_8bit() {
        let planes = Array3::<f32>::from_elem((2, 2, 4), 51.0);
        let normed = Normalization::Standard.apply(&planes, SampleFormat::U8).unwrap();
        assert!(normed.iter().all(|&v| v == 255));
    }

    #[test]
    fn test_sigmoid_reference_sums() {
        assert_eq!(total(&sigmoid(&arange(), 10.0, 0.125).unwrap()), 165926);
        assert_eq!(total(&sigmoid(&arange(), 5.0, 0.25).unwrap()), 137511);

        let normed = sigmoid(&arange(), SIGMOID_CONTRAST, SIGMOID_THRESHOLD).unwrap();
        assert_eq!(normed[[0, 0, 0]], 56);
        assert_eq!(normed[[15, 15, 2]], 254);
    }

    #[test]
    fn test_sentinel_reference_sum() {
        let normed = sentinel_true_color(&arange()).unwrap();
        assert_eq!(total(&normed), 37170);
    }

    #[test]
    fn test_sentinel_saturates_whole_pixel() {
        let mut planes = Array3::<f32>::from_elem((1, 2, 3), 1000.0);
        planes[[0, 0, 2]] = 2500.0;
        let normed = sentinel_true_color(&planes).unwrap();
        assert_eq!(normed.slice(s![0, 0, ..]).to_vec(), vec![255, 255, 255]);
        assert_eq!(normed.slice(s![0, 1, ..]).to_vec(), vec![127, 127, 127]);
    }

    #[test]
    fn test_sentinel_needs_three_channels() {
        let planes = Array3::<f32>::zeros((2, 2, 4));
        assert!(matches!(
            sentinel_true_color(&planes),
            Err(TilesError::Normalization { mode: "sentinel", .. })
        ));
    }

    #[test]
    fn test_all_nan_is_rejected() {
        let planes = Array3::<f32>::from_elem((2, 2, 3), f32::NAN);
        for mode in [Normalization::Scaling, Normalization::Sigmoid, Normalization::Standard] {
            assert!(matches!(
                mode.apply(&planes, SampleFormat::F32),
                Err(TilesError::Normalization { .. })
            ));
        }
    }

    #[test]
    fn test_nan_pixels_become_black() {
        let mut planes = arange();
        planes[[5, 5, 1]] = f32::NAN;
        for mode in Normalization::ALL {
            let normed = mode.apply(&planes, SampleFormat::F32).unwrap();
            assert_eq!(normed[[5, 5, 1]], 0, "mode {}", mode);
        }
    }

    #[test]
    fn test_output_always_in_display_range() {
        let mut planes = arange().mapv(|v| v * 97.0 - 20_000.0);
        planes[[0, 0, 0]] = f32::INFINITY;
        planes[[0, 0, 1]] = f32::NEG_INFINITY;
        for mode in Normalization::ALL {
            let normed = mode.apply(&planes, SampleFormat::F32).unwrap();
            assert_eq!(normed.dim(), (16, 16, 3));
        }
    }

    #[test]
    fn test_zero_channels_is_rejected() {
        let planes = Array3::<f32>::zeros((4, 4, 0));
        for mode in Normalization::ALL {
            assert!(mode.apply(&planes, SampleFormat::U8).is_err());
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("sigmoid".parse::<Normalization>().unwrap(), Normalization::Sigmoid);
        assert!("gamma".parse::<Normalization>().is_err());
    }
}
