//! Error taxonomy for the image-fft library.

use std::path::PathBuf;

use thiserror::Error;
use utils::GridError;
use utils::spectral::SpectralError;

#[derive(Debug, Error)]
pub enum Error {
    /// A file could not be read or written.
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The image container could not be decoded or encoded.
    #[error("image error for {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Grids that must share a shape do not.
    #[error("dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// A flat sample buffer does not hold `width * height` values.
    #[error("sample buffer holds {actual} values, expected {expected}")]
    BufferLength { expected: usize, actual: usize },

    /// The grid size cannot be transformed or persisted.
    #[error("unsupported dimensions {width}x{height}: {reason}")]
    UnsupportedDimensions {
        width: usize,
        height: usize,
        reason: &'static str,
    },

    /// A record is shorter than its header implies.
    #[error("truncated record: expected at least {expected} bytes, got {actual}")]
    TruncatedBuffer { expected: usize, actual: usize },

    /// A record header carries a non-positive or oversized width/height.
    #[error("invalid record header: width {width}, height {height}")]
    InvalidHeader { width: i32, height: i32 },

    /// The log-scale mapping has no usable base.
    #[error("degenerate log domain: {reason}")]
    DegenerateLogDomain { reason: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<SpectralError> for Error {
    fn from(e: SpectralError) -> Self {
        match e {
            SpectralError::UnsupportedDimensions {
                width,
                height,
                reason,
            } => Error::UnsupportedDimensions {
                width,
                height,
                reason,
            },
            SpectralError::DimensionMismatch { expected, found } => {
                Error::DimensionMismatch { expected, found }
            }
            SpectralError::Grid(e) => e.into(),
        }
    }
}

impl From<GridError> for Error {
    fn from(e: GridError) -> Self {
        match e {
            GridError::BufferLength { expected, actual } => {
                Error::BufferLength { expected, actual }
            }
            GridError::SizeOverflow { width, height } => Error::UnsupportedDimensions {
                width,
                height,
                reason: "image size overflow",
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
