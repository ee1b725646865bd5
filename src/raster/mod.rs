pub mod buffer;
pub mod sample;

pub use buffer::ImageBuffer;
pub use sample::SampleFormat;
