//! Query metrics.
//!
//! Counters are kept locally for [`LookupMetrics::snapshot`] and mirrored to
//! the global `metrics` recorder, if one is installed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use serde::Serialize;

use crate::query::QueryMode;

/// Metrics collector for one loaded map.
#[derive(Debug, Default)]
pub struct LookupMetrics {
    queries: AtomicU64,
    points: AtomicU64,
    unresolved: AtomicU64,
    /// Stored as microseconds for atomic ops.
    query_time_us: AtomicU64,
}

/// Point-in-time copy of [`LookupMetrics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub queries: u64,
    pub points: u64,
    pub unresolved: u64,
    pub avg_query_ms: f64,
}

impl LookupMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one answered query.
    pub fn record_query(&self, mode: QueryMode, points: usize, unresolved: usize, elapsed: Duration) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.points.fetch_add(points as u64, Ordering::Relaxed);
        self.unresolved.fetch_add(unresolved as u64, Ordering::Relaxed);
        self.query_time_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);

        counter!("dustmap_queries_total", "mode" => mode.as_str()).increment(1);
        counter!("dustmap_points_total").increment(points as u64);
        counter!("dustmap_points_unresolved_total").increment(unresolved as u64);
        histogram!("dustmap_query_duration_seconds").record(elapsed.as_secs_f64());
    }

    /// Record the size of a freshly loaded map.
    pub fn record_map_loaded(&self, pixels: usize, levels: usize) {
        gauge!("dustmap_pixels").set(pixels as f64);
        gauge!("dustmap_resolution_levels").set(levels as f64);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let queries = self.queries.load(Ordering::Relaxed);
        let total_us = self.query_time_us.load(Ordering::Relaxed);
        MetricsSnapshot {
            queries,
            points: self.points.load(Ordering::Relaxed),
            unresolved: self.unresolved.load(Ordering::Relaxed),
            avg_query_ms: if queries > 0 {
                total_us as f64 / queries as f64 / 1000.0
            } else {
                0.0
            },
        }
    }
}
