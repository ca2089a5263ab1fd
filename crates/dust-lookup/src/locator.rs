//! Resolves query points to table rows across all resolution levels.

use rayon::prelude::*;

use crate::error::{LookupError, Result};
use crate::null_policy::UNRESOLVED;
use crate::tessellation::TessellationIndex;

/// Point locator over a built [`TessellationIndex`].
///
/// Every level is probed for every point. Levels are scanned coarse to fine
/// and a later match replaces an earlier one, so when a map stores the same
/// sky at two resolutions the finest pixel wins.
#[derive(Debug, Clone, Copy)]
pub struct PointLocator<'a> {
    index: &'a TessellationIndex,
    parallel_threshold: usize,
}

impl<'a> PointLocator<'a> {
    pub fn new(index: &'a TessellationIndex, parallel_threshold: usize) -> Self {
        Self {
            index,
            parallel_threshold,
        }
    }

    /// Row holding Galactic (`lon`, `lat`) in degrees, or [`UNRESOLVED`].
    ///
    /// Non-finite coordinates and latitudes beyond the poles never resolve.
    pub fn locate_one(&self, lon: f64, lat: f64) -> Option<usize> {
        if !lon.is_finite() || !lat.is_finite() || lat.abs() > 90.0 {
            return UNRESOLVED;
        }

        let mut resolved = UNRESOLVED;
        for level in self.index.levels() {
            let pixel = level.grid().lonlat_to_pix(lon, lat);
            if let Some(row) = level.find(pixel) {
                resolved = Some(row);
            }
        }
        resolved
    }

    /// Rows for a batch of points, in input order.
    ///
    /// Batches at or above the parallel threshold are split across the rayon
    /// pool. The result does not depend on which path runs.
    pub fn locate(&self, lon: &[f64], lat: &[f64]) -> Result<Vec<Option<usize>>> {
        if lon.len() != lat.len() {
            return Err(LookupError::CoordinateLengthMismatch {
                lon: lon.len(),
                lat: lat.len(),
            });
        }

        let rows = if lon.len() >= self.parallel_threshold {
            lon.par_iter()
                .zip(lat.par_iter())
                .map(|(&l, &b)| self.locate_one(l, b))
                .collect()
        } else {
            lon.iter()
                .zip(lat)
                .map(|(&l, &b)| self.locate_one(l, b))
                .collect()
        };

        Ok(rows)
    }
}
