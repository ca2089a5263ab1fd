//! Error types for map persistence.

use thiserror::Error;

/// Errors that can occur while reading, writing or validating a map.
///
/// Every variant raised by [`crate::MapReader`] is fatal at startup: a map
/// that fails to load must never be served.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the map directory or one of its arrays.
    #[error("failed to open map: {0}")]
    OpenFailed(String),

    /// Failed to read array data.
    #[error("failed to read map data: {0}")]
    ReadFailed(String),

    /// Failed to write array data or metadata.
    #[error("failed to write map data: {0}")]
    WriteFailed(String),

    /// Missing or malformed map attributes.
    #[error("invalid map metadata: {0}")]
    InvalidMetadata(String),

    /// A column does not have the length implied by the map shape.
    #[error("column {column} has {actual} values, expected {expected}")]
    ShapeMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// The map contains no pixels.
    #[error("map contains no pixels")]
    EmptyMap,

    /// The map has no distance bins.
    #[error("map has zero distance bins")]
    ZeroDistanceBins,

    /// The map has no posterior samples.
    #[error("map has zero posterior samples per pixel")]
    ZeroSamples,

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Storage/IO error.
    #[error("storage error: {0}")]
    StorageError(String),
}

impl StoreError {
    /// Create an OpenFailed error.
    pub fn open_failed(msg: impl Into<String>) -> Self {
        Self::OpenFailed(msg.into())
    }

    /// Create a ReadFailed error.
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }

    /// Create a WriteFailed error.
    pub fn write_failed(msg: impl Into<String>) -> Self {
        Self::WriteFailed(msg.into())
    }

    /// Create an InvalidMetadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(column: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            column: column.into(),
            expected,
            actual,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
