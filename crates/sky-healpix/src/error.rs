//! Error types for sky pixelisation.

use thiserror::Error;

/// Errors raised when constructing or addressing a HEALPix grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HealpixError {
    /// nside is zero, not a power of two, or beyond the supported order.
    #[error("invalid nside {0}: must be a power of two between 1 and 2^29")]
    InvalidNside(u32),

    /// Pixel identifier is not below 12 * nside^2.
    #[error("pixel {pixel} is out of range for nside {nside}")]
    PixelOutOfRange { pixel: u64, nside: u32 },
}

/// Result type for pixelisation operations.
pub type Result<T> = std::result::Result<T, HealpixError>;
