use thiserror::Error;

/// Errors surfaced by the quantization pipeline.
///
/// All of these are caller-input errors. Numeric corner cases such as an
/// empty cluster or an image without opaque pixels are handled by policy and
/// never show up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuantizeError {
    /// Bucket count is zero/negative or exceeds the distinct opaque colors.
    #[error("invalid bucket count {requested}: expected 1..={available}")]
    InvalidBucketCount { requested: i64, available: usize },

    /// Pixel buffer length does not match `width * height * 4`.
    #[error("dimension mismatch: {width}x{height} needs {expected} bytes, got {actual}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// Cluster assignments are not index-aligned with the pixel buffer.
    #[error("cluster assignments cover {assignments} pixels but the buffer holds {pixels}")]
    MisalignedAssignments { pixels: usize, assignments: usize },

    /// A configuration value is outside its domain.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}
