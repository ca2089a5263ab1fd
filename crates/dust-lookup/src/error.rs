//! Error types for the lookup engine.

use dustmap_store::StoreError;
use thiserror::Error;

/// Errors raised while building the tessellation or answering a query.
///
/// Build-time variants are fatal: a map that produces one must not be
/// served. Unresolved query points are not errors; they are reported per
/// point through the `success` field.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The nside and pixel identifier columns differ in length.
    #[error("column length mismatch: {nside} nside values, {pixels} pixel identifiers")]
    ColumnLengthMismatch { nside: usize, pixels: usize },

    /// A row carries an nside that is not a power of two.
    #[error("row {row}: invalid nside {nside}")]
    InvalidNside { row: usize, nside: u32 },

    /// A row carries a pixel identifier outside its resolution level.
    #[error("row {row}: pixel {pixel} is out of range for nside {nside}")]
    PixelOutOfRange { row: usize, pixel: u64, nside: u32 },

    /// The same pixel appears twice within one resolution level.
    #[error("duplicate pixel {pixel} at nside {nside} (rows {first_row} and {second_row})")]
    DuplicatePixel {
        nside: u32,
        pixel: u64,
        first_row: usize,
        second_row: usize,
    },

    /// Longitude and latitude batches differ in length.
    #[error("coordinate length mismatch: {lon} longitudes, {lat} latitudes")]
    CoordinateLengthMismatch { lon: usize, lat: usize },

    /// Per-point distances do not match the number of points.
    #[error("distance length mismatch: {points} points, {distances} distances")]
    DistanceLengthMismatch { points: usize, distances: usize },

    /// A distance is negative or not finite.
    #[error("invalid distance {0} kpc: must be finite and non-negative")]
    InvalidDistance(f64),

    /// Invalid lookup configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The map artifact could not be loaded.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for lookup operations.
pub type Result<T> = std::result::Result<T, LookupError>;
