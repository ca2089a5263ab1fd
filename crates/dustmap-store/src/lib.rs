//! Persistence layer for multi-resolution dust reddening maps.
//!
//! A map is stored as a directory of Zarr V3 arrays, one array per column
//! of the per-pixel statistical table:
//!
//! ```text
//! map.zarr/
//! ├── nside/            u32   [n_pix]
//! ├── healpix_index/    u64   [n_pix]
//! ├── best/             f32   [n_pix, n_bins]
//! ├── samples/          f32   [n_pix, n_samples, n_bins]
//! ├── GR/               f32   [n_pix, n_bins]
//! ├── n_stars/          u32   [n_pix]
//! ├── DM_reliable_min/  f32   [n_pix]
//! ├── DM_reliable_max/  f32   [n_pix]
//! ├── EBV_SFD/          f32   [n_pix]
//! └── distmod/          f64   [n_bins]   (carries the map attributes)
//! ```
//!
//! The whole map is read into memory once with [`MapReader`]; nothing in
//! this crate is touched again after startup.
//!
//! # Example
//!
//! ```ignore
//! use dustmap_store::{MapReader, StoreConfig};
//!
//! let config = StoreConfig::from_env();
//! let loaded = MapReader::open(&config.map_path)?;
//! println!("{} pixels, {} distance bins", loaded.table.len(), loaded.table.n_bins);
//! ```

pub mod config;
pub mod error;
pub mod reader;
pub mod table;
pub mod writer;

pub use config::{StoreConfig, ZarrCompression};
pub use error::{Result, StoreError};
pub use reader::{LoadedMap, MapMetadata, MapReader};
pub use table::PixelTable;
pub use writer::{MapWriteResult, MapWriter};

/// Version tag written into the `distmod` array attributes.
pub const FORMAT_VERSION: u64 = 1;
