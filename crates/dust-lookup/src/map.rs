//! The loaded, queryable dust map.

use std::path::Path;
use std::time::Instant;

use dustmap_store::{MapMetadata, MapReader, PixelTable};
use serde::Serialize;
use sky_healpix::CoordFrame;

use crate::config::LookupConfig;
use crate::error::{LookupError, Result};
use crate::extract::PayloadExtractor;
use crate::locator::PointLocator;
use crate::los_table::render_los_table;
use crate::metrics::{LookupMetrics, MetricsSnapshot};
use crate::null_policy::NullPolicy;
use crate::query::{DustQuery, QueryMode};
use crate::result::QueryResult;
use crate::tessellation::TessellationIndex;

/// A validated map held in memory with its tessellation index.
///
/// Immutable after construction, so a single instance can serve queries
/// from many threads.
#[derive(Debug)]
pub struct DustMap {
    metadata: MapMetadata,
    table: PixelTable,
    index: TessellationIndex,
    config: LookupConfig,
    metrics: LookupMetrics,
}

/// Description of a loaded map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSummary {
    pub map_name: String,
    pub n_pix: usize,
    pub n_bins: usize,
    pub n_samples: usize,
    pub distmod_min: f64,
    pub distmod_max: f64,
    pub levels: Vec<LevelSummary>,
}

/// Pixel count of one resolution level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelSummary {
    pub nside: u32,
    pub pixels: usize,
}

impl DustMap {
    /// Load and index the map artifact at `path`.
    pub fn open(path: &Path, config: LookupConfig) -> Result<Self> {
        config.validate().map_err(LookupError::Config)?;
        let loaded = MapReader::open(path)?;
        Self::build(loaded.metadata, loaded.table, config)
    }

    /// Index an in-memory table.
    pub fn from_table(table: PixelTable, map_name: &str, config: LookupConfig) -> Result<Self> {
        config.validate().map_err(LookupError::Config)?;
        table.validate()?;
        let metadata = MapMetadata {
            map_name: map_name.to_string(),
            format_version: dustmap_store::FORMAT_VERSION,
            n_pix: table.len(),
            n_bins: table.n_bins,
            n_samples: table.n_samples,
        };
        Self::build(metadata, table, config)
    }

    fn build(metadata: MapMetadata, table: PixelTable, config: LookupConfig) -> Result<Self> {
        let index = TessellationIndex::build(&table.nside, &table.healpix_index)?;

        for level in index.levels() {
            tracing::info!(
                nside = level.nside(),
                pixels = level.len(),
                "Indexed resolution level"
            );
        }

        let overlapping = index.overlapping_pixels();
        if overlapping > 0 {
            tracing::warn!(
                overlapping,
                "Pixels stored at more than one resolution; the finest level answers"
            );
        }

        let metrics = LookupMetrics::new();
        metrics.record_map_loaded(index.pixel_count(), index.levels().len());

        Ok(Self {
            metadata,
            table,
            index,
            config,
            metrics,
        })
    }

    /// Answer a query.
    ///
    /// Points outside the map are reported with `success = 0` rather than as
    /// an error. Errors are reserved for malformed input.
    pub fn query(&self, query: &DustQuery) -> Result<QueryResult> {
        let started = Instant::now();

        let (lon, lat) = query.coords.to_galactic(query.frame)?;
        let distances = match (&query.distances, query.mode) {
            (Some(d), QueryMode::Full | QueryMode::Summary) => Some(d.expand(lon.len())?),
            _ => None,
        };

        let rows = self.locator().locate(&lon, &lat)?;
        let unresolved = rows.iter().filter(|row| row.is_none()).count();

        let result = PayloadExtractor::new(&self.table, &self.config).extract(
            &rows,
            query.coords.shape(),
            query.mode,
            distances.as_deref(),
        );

        let elapsed = started.elapsed();
        tracing::debug!(
            mode = %query.mode,
            points = rows.len(),
            unresolved,
            elapsed_us = elapsed.as_micros() as u64,
            "Answered query"
        );
        self.metrics
            .record_query(query.mode, rows.len(), unresolved, elapsed);

        Ok(result)
    }

    /// Table rows for Galactic points, `None` where unresolved.
    pub fn locate(&self, lon: &[f64], lat: &[f64]) -> Result<Vec<Option<usize>>> {
        self.locator().locate(lon, lat)
    }

    /// ASCII table of the best fit and samples along one line of sight.
    pub fn los_table(&self, lon: f64, lat: f64, frame: CoordFrame) -> String {
        let (l, b) = frame.to_galactic(lon, lat);
        let row = self.locator().locate_one(l, b);
        let converged = NullPolicy::new(self.config.convergence_threshold)
            .converged_flag(row.map(|r| self.table.gr(r)))
            == 1;
        render_los_table(l, b, &self.table, row, converged)
    }

    pub fn summary(&self) -> MapSummary {
        MapSummary {
            map_name: self.metadata.map_name.clone(),
            n_pix: self.table.len(),
            n_bins: self.table.n_bins,
            n_samples: self.table.n_samples,
            distmod_min: self.table.distmod.first().copied().unwrap_or(f64::NAN),
            distmod_max: self.table.distmod.last().copied().unwrap_or(f64::NAN),
            levels: self
                .index
                .levels()
                .iter()
                .map(|level| LevelSummary {
                    nside: level.nside(),
                    pixels: level.len(),
                })
                .collect(),
        }
    }

    pub fn locator(&self) -> PointLocator<'_> {
        PointLocator::new(&self.index, self.config.parallel_threshold)
    }

    pub fn metadata(&self) -> &MapMetadata {
        &self.metadata
    }

    pub fn table(&self) -> &PixelTable {
        &self.table
    }

    pub fn index(&self) -> &TessellationIndex {
        &self.index
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
