//! Configuration for the lookup engine.

use serde::{Deserialize, Serialize};

/// Default size of the reduced ensemble in summary mode.
pub const DEFAULT_SUMMARY_SAMPLES: usize = 10;

/// Tunables for query post-processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupConfig {
    /// A pixel counts as converged when every per-bin GR value is below this.
    pub convergence_threshold: f32,

    /// Sample profiles returned per point in summary mode. Percentiles are
    /// always taken over the whole ensemble.
    pub summary_max_samples: usize,

    /// Decimal places kept in floating output (`None` = no rounding).
    pub decimals: Option<u32>,

    /// Batches at least this large are located on the rayon pool.
    pub parallel_threshold: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            convergence_threshold: 1.2,
            summary_max_samples: DEFAULT_SUMMARY_SAMPLES,
            decimals: Some(5),
            parallel_threshold: 4096,
        }
    }
}

impl LookupConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("DUSTMAP_CONVERGENCE_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.convergence_threshold = threshold;
            }
        }

        if let Ok(val) = std::env::var("DUSTMAP_SUMMARY_SAMPLES") {
            if let Ok(samples) = val.parse() {
                config.summary_max_samples = samples;
            }
        }

        if let Ok(val) = std::env::var("DUSTMAP_DECIMALS") {
            config.decimals = match val.to_lowercase().as_str() {
                "none" | "off" => None,
                other => other.parse().ok().or(config.decimals),
            };
        }

        if let Ok(val) = std::env::var("DUSTMAP_PARALLEL_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.parallel_threshold = threshold;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.convergence_threshold.is_finite() || self.convergence_threshold <= 0.0 {
            return Err("convergence_threshold must be a positive number".to_string());
        }

        if self.summary_max_samples == 0 {
            return Err("summary_max_samples must be > 0".to_string());
        }

        if let Some(decimals) = self.decimals {
            if decimals > 15 {
                return Err("decimals must be at most 15".to_string());
            }
        }

        if self.parallel_threshold == 0 {
            return Err("parallel_threshold must be > 0".to_string());
        }

        Ok(())
    }
}
