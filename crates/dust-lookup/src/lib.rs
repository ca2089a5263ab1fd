//! Lookup engine for 3D dust reddening maps on a multi-resolution HEALPix
//! tessellation.
//!
//! A map stores, per sky pixel, a best-fit reddening profile over distance
//! bins, an ensemble of posterior samples, per-bin convergence diagnostics,
//! and a few scalars. Pixels come from several HEALPix resolutions at once
//! and together tile the sky without overlap.
//!
//! The engine is organised as four stages:
//!
//! - [`tessellation`] builds a sorted per-resolution index of the pixels.
//! - [`locator`] maps query points to table rows, one binary search per level.
//! - [`extract`] gathers the requested fields for the located rows.
//! - [`null_policy`] zero-fills unresolved points and restores scalar shape.
//!
//! [`DustMap`] ties them together:
//!
//! ```ignore
//! use dust_lookup::{Coordinates, DustMap, DustQuery, LookupConfig, QueryMode};
//!
//! let map = DustMap::open("data/bayestar.zarr".as_ref(), LookupConfig::from_env())?;
//! let result = map.query(
//!     &DustQuery::new(Coordinates::scalar(90.0, 10.0)).with_mode(QueryMode::Summary),
//! )?;
//! ```

pub mod config;
pub mod distance;
pub mod error;
pub mod extract;
pub mod locator;
pub mod los_table;
pub mod map;
pub mod metrics;
pub mod null_policy;
pub mod query;
pub mod result;
pub mod stats;
pub mod tessellation;

pub use config::{LookupConfig, DEFAULT_SUMMARY_SAMPLES};
pub use error::{LookupError, Result};
pub use extract::PayloadExtractor;
pub use locator::PointLocator;
pub use los_table::render_los_table;
pub use map::{DustMap, LevelSummary, MapSummary};
pub use crate::metrics::{LookupMetrics, MetricsSnapshot};
pub use null_policy::{NullPolicy, QueryShape, UNRESOLVED};
pub use query::{Coordinates, Distances, DustQuery, QueryMode};
pub use result::{fields, FieldValue, QueryResult};
pub use sky_healpix::CoordFrame;
pub use tessellation::{ResolutionLevel, TessellationIndex};
