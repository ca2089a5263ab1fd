//! Zarr V3 reader that loads a whole map into memory.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use zarrs::array::{Array, ElementOwned};
use zarrs::array_subset::ArraySubset;
use zarrs_filesystem::FilesystemStore;

use crate::error::{Result, StoreError};
use crate::table::PixelTable;
use crate::FORMAT_VERSION;

/// Map-wide metadata read from the artifact attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMetadata {
    /// Name recorded by the map generator.
    pub map_name: String,
    /// Artifact format version.
    pub format_version: u64,
    /// Number of pixels.
    pub n_pix: usize,
    /// Distance bins per profile.
    pub n_bins: usize,
    /// Posterior samples per pixel.
    pub n_samples: usize,
}

/// A fully loaded, validated map.
#[derive(Debug, Clone)]
pub struct LoadedMap {
    pub metadata: MapMetadata,
    pub table: PixelTable,
}

/// Reader for map artifacts written by [`crate::MapWriter`].
pub struct MapReader;

impl MapReader {
    /// Read every column of the map stored under `dir` and validate it.
    ///
    /// This is a one-time blocking load. Any error means the map must not
    /// be served.
    pub fn open(dir: &Path) -> Result<LoadedMap> {
        let started = Instant::now();

        if !dir.is_dir() {
            return Err(StoreError::open_failed(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let store = Arc::new(
            FilesystemStore::new(dir).map_err(|e| StoreError::open_failed(e.to_string()))?,
        );

        let distmod_array = Array::open(store.clone(), "/distmod")
            .map_err(|e| StoreError::open_failed(format!("/distmod: {}", e)))?;
        let (map_name, format_version) = Self::read_attributes(&distmod_array)?;
        let (distmod, _) = Self::read_array::<f64>(&distmod_array, "/distmod", 1)?;

        let (nside, _) = Self::read_column::<u32>(&store, "/nside", 1)?;
        let (healpix_index, _) = Self::read_column::<u64>(&store, "/healpix_index", 1)?;
        let (n_stars, _) = Self::read_column::<u32>(&store, "/n_stars", 1)?;
        let (best, best_shape) = Self::read_column::<f32>(&store, "/best", 2)?;
        let (samples, samples_shape) = Self::read_column::<f32>(&store, "/samples", 3)?;
        let (gr, gr_shape) = Self::read_column::<f32>(&store, "/GR", 2)?;
        let (dm_reliable_min, _) = Self::read_column::<f32>(&store, "/DM_reliable_min", 1)?;
        let (dm_reliable_max, _) = Self::read_column::<f32>(&store, "/DM_reliable_max", 1)?;
        let (ebv_sfd, _) = Self::read_column::<f32>(&store, "/EBV_SFD", 1)?;

        let n_bins = distmod.len();
        for (column, shape) in [("/best", &best_shape), ("/GR", &gr_shape)] {
            if shape[1] as usize != n_bins {
                return Err(StoreError::shape_mismatch(column, n_bins, shape[1] as usize));
            }
        }
        if samples_shape[2] as usize != n_bins {
            return Err(StoreError::shape_mismatch(
                "/samples",
                n_bins,
                samples_shape[2] as usize,
            ));
        }
        let n_samples = samples_shape[1] as usize;

        let table = PixelTable {
            nside,
            healpix_index,
            n_bins,
            n_samples,
            distmod,
            best,
            samples,
            gr,
            n_stars,
            dm_reliable_min,
            dm_reliable_max,
            ebv_sfd,
        };
        table.validate()?;

        let metadata = MapMetadata {
            map_name,
            format_version,
            n_pix: table.len(),
            n_bins,
            n_samples,
        };

        tracing::info!(
            path = %dir.display(),
            map_name = %metadata.map_name,
            n_pix = metadata.n_pix,
            n_bins,
            n_samples,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Loaded dust map"
        );

        Ok(LoadedMap { metadata, table })
    }

    fn read_attributes(array: &Array<FilesystemStore>) -> Result<(String, u64)> {
        let attrs = array.attributes();

        let format_version = attrs
            .get("format_version")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| StoreError::invalid_metadata("missing format_version attribute"))?;
        if format_version != FORMAT_VERSION {
            return Err(StoreError::invalid_metadata(format!(
                "unsupported format_version {} (expected {})",
                format_version, FORMAT_VERSION
            )));
        }

        let map_name = attrs
            .get("map_name")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        Ok((map_name, format_version))
    }

    fn read_column<T: ElementOwned>(
        store: &Arc<FilesystemStore>,
        path: &str,
        ndim: usize,
    ) -> Result<(Vec<T>, Vec<u64>)> {
        let array = Array::open(store.clone(), path)
            .map_err(|e| StoreError::open_failed(format!("{}: {}", path, e)))?;
        Self::read_array(&array, path, ndim)
    }

    /// Read an entire array, checking its dimensionality.
    fn read_array<T: ElementOwned>(
        array: &Array<FilesystemStore>,
        path: &str,
        ndim: usize,
    ) -> Result<(Vec<T>, Vec<u64>)> {
        let shape = array.shape().to_vec();
        if shape.len() != ndim {
            return Err(StoreError::invalid_metadata(format!(
                "{} has {} dimensions, expected {}",
                path,
                shape.len(),
                ndim
            )));
        }

        let subset = ArraySubset::new_with_start_shape(vec![0; ndim], shape.clone())
            .map_err(|e| StoreError::read_failed(format!("{}: {}", path, e)))?;

        let data: Vec<T> = array
            .retrieve_array_subset_elements(&subset)
            .map_err(|e| StoreError::read_failed(format!("{}: {}", path, e)))?;

        Ok((data, shape))
    }
}
