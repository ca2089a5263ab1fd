//! Zarr V3 writer for dust map artifacts.
//!
//! Map generation happens offline; this writer exists so that tools and
//! tests can produce artifacts the reader accepts.

use std::path::Path;
use std::sync::Arc;

use zarrs::array::codec::bytes_to_bytes::blosc::{
    BloscCodec, BloscCompressionLevel, BloscCompressor, BloscShuffleMode,
};
use zarrs::array::{ArrayBuilder, DataType, Element, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs_filesystem::FilesystemStore;

use crate::config::{StoreConfig, ZarrCompression};
use crate::error::{Result, StoreError};
use crate::table::PixelTable;
use crate::FORMAT_VERSION;

/// Result of writing a map.
#[derive(Debug)]
pub struct MapWriteResult {
    /// Number of pixels written.
    pub n_pix: usize,
    /// Total uncompressed bytes written.
    pub bytes_written: u64,
}

/// Writer for creating map artifacts from a [`PixelTable`].
pub struct MapWriter {
    config: StoreConfig,
}

impl MapWriter {
    /// Create a new MapWriter with the given configuration.
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Write `table` as a set of Zarr arrays under `dir`.
    ///
    /// The table is validated first; an invalid table is never written.
    pub fn write(&self, dir: &Path, table: &PixelTable, map_name: &str) -> Result<MapWriteResult> {
        table.validate()?;
        self.config
            .validate()
            .map_err(StoreError::ConfigError)?;

        std::fs::create_dir_all(dir)?;
        let store = Arc::new(
            FilesystemStore::new(dir).map_err(|e| StoreError::StorageError(e.to_string()))?,
        );

        let n_pix = table.len() as u64;
        let n_bins = table.n_bins as u64;
        let n_samples = table.n_samples as u64;

        let mut attrs = serde_json::Map::new();
        attrs.insert("map_name".to_string(), serde_json::json!(map_name));
        attrs.insert("format_version".to_string(), serde_json::json!(FORMAT_VERSION));

        let mut bytes_written = 0u64;
        bytes_written += self.write_column(
            &store,
            "/distmod",
            vec![n_bins],
            DataType::Float64,
            FillValue::from(0f64),
            &table.distmod,
            attrs,
        )?;
        bytes_written += self.write_column(
            &store,
            "/nside",
            vec![n_pix],
            DataType::UInt32,
            FillValue::from(0u32),
            &table.nside,
            serde_json::Map::new(),
        )?;
        bytes_written += self.write_column(
            &store,
            "/healpix_index",
            vec![n_pix],
            DataType::UInt64,
            FillValue::from(0u64),
            &table.healpix_index,
            serde_json::Map::new(),
        )?;
        bytes_written += self.write_column(
            &store,
            "/n_stars",
            vec![n_pix],
            DataType::UInt32,
            FillValue::from(0u32),
            &table.n_stars,
            serde_json::Map::new(),
        )?;

        let float_columns: [(&str, Vec<u64>, &[f32]); 6] = [
            ("/best", vec![n_pix, n_bins], &table.best),
            ("/samples", vec![n_pix, n_samples, n_bins], &table.samples),
            ("/GR", vec![n_pix, n_bins], &table.gr),
            ("/DM_reliable_min", vec![n_pix], &table.dm_reliable_min),
            ("/DM_reliable_max", vec![n_pix], &table.dm_reliable_max),
            ("/EBV_SFD", vec![n_pix], &table.ebv_sfd),
        ];
        for (path, shape, data) in float_columns {
            bytes_written += self.write_column(
                &store,
                path,
                shape,
                DataType::Float32,
                FillValue::from(0f32),
                data,
                serde_json::Map::new(),
            )?;
        }

        tracing::info!(
            path = %dir.display(),
            map_name,
            n_pix,
            n_bins,
            n_samples,
            bytes_written,
            compression = %self.config.compression,
            "Wrote dust map"
        );

        Ok(MapWriteResult {
            n_pix: table.len(),
            bytes_written,
        })
    }

    /// Write one column as its own Zarr array, chunked along the pixel axis.
    #[allow(clippy::too_many_arguments)]
    fn write_column<T: Element>(
        &self,
        store: &Arc<FilesystemStore>,
        path: &str,
        shape: Vec<u64>,
        data_type: DataType,
        fill_value: FillValue,
        data: &[T],
        attrs: serde_json::Map<String, serde_json::Value>,
    ) -> Result<u64> {
        // Chunks span whole rows; only the leading axis is split.
        let mut chunk_shape = shape.clone();
        chunk_shape[0] = (self.config.chunk_rows as u64).min(shape[0]).max(1);
        for dim in chunk_shape.iter_mut().skip(1) {
            *dim = (*dim).max(1);
        }

        let chunk_grid: zarrs::array::ChunkGrid = chunk_shape
            .try_into()
            .map_err(|e| StoreError::ConfigError(format!("{:?}", e)))?;

        let mut binding = ArrayBuilder::new(shape.clone(), data_type, chunk_grid, fill_value);
        let mut builder = binding.attributes(attrs);

        if self.config.compression != ZarrCompression::None {
            let codec = self.create_compression_codec(std::mem::size_of::<T>())?;
            builder = builder.bytes_to_bytes_codecs(vec![codec]);
        }

        let array = builder
            .build(store.clone(), path)
            .map_err(|e| StoreError::write_failed(format!("{}: {}", path, e)))?;

        array
            .store_metadata()
            .map_err(|e| StoreError::write_failed(format!("{}: {}", path, e)))?;

        let subset = ArraySubset::new_with_start_shape(vec![0; shape.len()], shape)
            .map_err(|e| StoreError::write_failed(format!("{}: {}", path, e)))?;

        array
            .store_array_subset_elements(&subset, data)
            .map_err(|e| StoreError::write_failed(format!("{}: {}", path, e)))?;

        Ok(std::mem::size_of_val(data) as u64)
    }

    /// Create the compression codec based on configuration.
    fn create_compression_codec(
        &self,
        typesize: usize,
    ) -> Result<Arc<dyn zarrs::array::codec::BytesToBytesCodecTraits>> {
        let level = BloscCompressionLevel::try_from(self.config.compression_level)
            .map_err(|_| StoreError::ConfigError("Invalid compression level".to_string()))?;

        let shuffle = if self.config.shuffle {
            BloscShuffleMode::Shuffle
        } else {
            BloscShuffleMode::NoShuffle
        };

        // typesize is required when shuffle is enabled
        let typesize = if self.config.shuffle {
            Some(typesize)
        } else {
            None
        };

        let compressor = match self.config.compression {
            ZarrCompression::None => {
                return Err(StoreError::ConfigError(
                    "No compression configured".to_string(),
                ))
            }
            ZarrCompression::BloscLz4 => BloscCompressor::LZ4,
            ZarrCompression::BloscZstd => BloscCompressor::Zstd,
        };

        let codec = BloscCodec::new(compressor, level, None, shuffle, typesize)
            .map_err(|e| StoreError::ConfigError(e.to_string()))?;

        Ok(Arc::new(codec))
    }
}
