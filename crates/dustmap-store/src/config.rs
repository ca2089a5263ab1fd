//! Configuration for the map store.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for reading and writing map artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the Zarr arrays of the map.
    pub map_path: PathBuf,

    /// Pixel rows per chunk when writing.
    pub chunk_rows: usize,

    /// Compression codec for written arrays.
    pub compression: ZarrCompression,

    /// Compression level (1-9).
    pub compression_level: u8,

    /// Enable byte shuffle filter for better compression.
    pub shuffle: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            map_path: PathBuf::from("data/bayestar.zarr"),
            chunk_rows: 4096,
            compression: ZarrCompression::BloscZstd,
            compression_level: 3,
            shuffle: true,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("DUSTMAP_PATH") {
            config.map_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("DUSTMAP_CHUNK_ROWS") {
            if let Ok(rows) = val.parse() {
                config.chunk_rows = rows;
            }
        }

        if let Ok(val) = std::env::var("DUSTMAP_COMPRESSION") {
            config.compression = ZarrCompression::from_str(&val);
        }

        if let Ok(val) = std::env::var("DUSTMAP_COMPRESSION_LEVEL") {
            if let Ok(level) = val.parse() {
                config.compression_level = level;
            }
        }

        if let Ok(val) = std::env::var("DUSTMAP_SHUFFLE") {
            config.shuffle = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_rows == 0 {
            return Err("chunk_rows must be > 0".to_string());
        }

        if self.compression_level == 0 || self.compression_level > 9 {
            return Err("compression_level must be 1-9".to_string());
        }

        if self.map_path.as_os_str().is_empty() {
            return Err("map_path must not be empty".to_string());
        }

        Ok(())
    }
}

/// Compression codec for Zarr arrays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZarrCompression {
    /// No compression.
    None,
    /// Blosc with LZ4.
    BloscLz4,
    /// Blosc with Zstd (recommended).
    #[default]
    BloscZstd,
}

impl ZarrCompression {
    /// Parse from string (case-insensitive). Unknown names fall back to Blosc/Zstd.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "none" => Self::None,
            "lz4" | "blosc_lz4" => Self::BloscLz4,
            _ => Self::BloscZstd,
        }
    }

    /// Get the codec name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BloscLz4 => "blosc_lz4",
            Self::BloscZstd => "blosc_zstd",
        }
    }
}

impl std::fmt::Display for ZarrCompression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
