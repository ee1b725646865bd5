use std::fmt;
use std::str::FromStr;

use ndarray::{s, Array2, Array3, Axis};
use serde::Serialize;

use crate::error::{Result, TilesError};
use crate::raster::ImageBuffer;

/// Luma weights applied by `RenderMode::Bw`.
const BW_WEIGHTS: [f32; 3] = [0.30, 0.59, 0.11];

/// Selects which source channels become the red, green and blue planes.
///
/// - `Rgb`:      channels 0, 1, 2 (a fourth alpha channel is ignored).
/// - `Bgr`:      channels 2, 1, 0.
/// - `Bw`:       weighted luma of channels 0..3, replicated to all planes.
/// - `Sentinel`: channels 1, 2, 3, i.e. Sentinel-2 B2/B3/B4 when the
///   stack starts at B1.
///
/// A single-channel image is treated as grayscale and replicated under
/// every mode except `Sentinel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Rgb,
    Bgr,
    Bw,
    Sentinel,
}

impl RenderMode {
    pub const ALL: [RenderMode; 4] = [
        RenderMode::Rgb,
        RenderMode::Bgr,
        RenderMode::Bw,
        RenderMode::Sentinel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RenderMode::Rgb => "rgb",
            RenderMode::Bgr => "bgr",
            RenderMode::Bw => "bw",
            RenderMode::Sentinel => "sentinel",
        }
    }

    /// Number of source channels the mode reads.
    pub fn required_channels(self) -> usize {
        match self {
            RenderMode::Rgb | RenderMode::Bgr | RenderMode::Bw => 3,
            RenderMode::Sentinel => 4,
        }
    }

    /// Builds the 3-plane (row, column, rgb) array for this mode.
    ///
    /// The source buffer is only read; the result is a new array.
    pub fn apply(self, buffer: &ImageBuffer) -> Result<Array3<f32>> {
        let found = buffer.channels();
        let data = buffer.data();

        if found == 1 && self != RenderMode::Sentinel {
            let gray = data.index_axis(Axis(2), 0);
            return Ok(replicate(gray.to_owned()));
        }

        if found < self.required_channels() {
            return Err(TilesError::ChannelMismatch {
                mode: self.name(),
                required: self.required_channels(),
                found,
            });
        }

        let planes = match self {
            RenderMode::Rgb => data.slice(s![.., .., 0..3]).to_owned(),
            RenderMode::Bgr => data.slice(s![.., .., 0..3;-1]).to_owned(),
            RenderMode::Sentinel => data.slice(s![.., .., 1..4]).to_owned(),
            RenderMode::Bw => {
                let gray = data.index_axis(Axis(2), 0).mapv(|v| v * BW_WEIGHTS[0])
                    + data.index_axis(Axis(2), 1).mapv(|v| v * BW_WEIGHTS[1])
                    + data.index_axis(Axis(2), 2).mapv(|v| v * BW_WEIGHTS[2]);
                replicate(gray)
            }
        };
        Ok(planes)
    }
}

fn replicate(gray: Array2<f32>) -> Array3<f32> {
    let (rows, cols) = gray.dim();
    Array3::from_shape_fn((rows, cols, 3), |(r, c, _)| gray[[r, c]])
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RenderMode {
    type Err = TilesError;

    fn from_str(s: &str) -> Result<Self> {
        RenderMode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TilesError::InvalidOption {
                name: "render_mode",
                value: s.to_owned(),
            })
    }
}
