//! Sky pixelisation for the dust map.
//!
//! Implements the HEALPix nested indexing scheme from scratch, plus the
//! fixed rotation between the ICRS (equatorial) and Galactic frames.
//!
//! Longitudes and latitudes at the public boundary are in degrees; the
//! HEALPix routines themselves work on colatitude `theta` and azimuth `phi`
//! in radians, the same convention the map generation tools use.

pub mod error;
pub mod frames;
pub mod nested;

pub use error::{HealpixError, Result};
pub use frames::{galactic_to_icrs, icrs_to_galactic, CoordFrame};
pub use nested::{npix, order_of, Nested, MAX_ORDER};
