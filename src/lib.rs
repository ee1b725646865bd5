pub mod error;
pub mod raster;
pub mod storage;
pub mod loader;
pub mod render;

// Convenience re-exports
pub use error::{Result, TilesError};
pub use raster::{ImageBuffer, SampleFormat};
pub use storage::{Location, S3Config, Storage};
pub use loader::{load, Codec};
pub use render::{render, render_pixels, Normalization, OutputFormat, RenderMode, RenderOptions};
