//! ICC error types.

use thiserror::Error;

/// Result type for ICC operations.
pub type IccResult<T> = Result<T, IccError>;

/// Errors that can occur during ICC operations.
#[derive(Debug, Error)]
pub enum IccError {
    /// Failed to load profile from file.
    #[error("failed to load profile: {0}")]
    LoadFailed(String),

    /// Failed to create or serialize a profile.
    #[error("failed to create profile: {0}")]
    CreateFailed(String),

    /// Failed to create transform.
    #[error("failed to create transform: {0}")]
    TransformFailed(String),

    /// Invalid profile data.
    #[error("invalid profile data: {0}")]
    InvalidProfile(String),

    /// The profile's color space has no pixel format mapping.
    #[error("unsupported profile color space: {0}")]
    UnsupportedColorSpace(String),

    /// A pixel layout wider than the transform kernels support.
    #[error("unsupported pixel size: {0} samples")]
    UnsupportedPixelSize(usize),

    /// Buffer length does not match the pixel layout.
    #[error("buffer size mismatch: expected {expected} samples, got {actual}")]
    BufferSize {
        /// Expected number of samples.
        expected: usize,
        /// Actual number of samples.
        actual: usize,
    },

    /// Unrecognized rendering intent name.
    #[error("unknown rendering intent: {0}")]
    UnknownIntent(String),

    /// Invalid profile directory configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
