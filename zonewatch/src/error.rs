//! # Error types

use crate::frame::PixelFormat;
use thiserror::Error;

/// Result type of detector operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the detector core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Frame is not single-channel 8-bit.
    #[error("only 8-bit single channel frames are supported, got {0:?}")]
    Format(PixelFormat),

    /// Pixel buffer length does not match the frame dimensions.
    #[error("pixel buffer holds {actual} bytes, {expected} expected")]
    BufferSize { expected: usize, actual: usize },

    /// Two frames that were meant to be compared have different dimensions.
    #[error("frame dimensions changed from {expected:?} to {actual:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Alert settings are not usable.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl Error {
    /// Whether this is a pixel format violation.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}
