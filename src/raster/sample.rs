/// Element type the samples had in the source file.
///
/// Decoded pixels are always widened to `f32`; this records the original
/// range so normalization can tell 8-bit display data from sensor data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl SampleFormat {
    /// True when every sample already fits the 0..=255 display range.
    pub fn is_display_range(self) -> bool {
        matches!(self, SampleFormat::U8)
    }
}
