//! Common test fixtures for dustmap tests.
//!
//! This module provides pre-defined maps and sky positions that represent
//! common lookup scenarios.

use dustmap_store::PixelTable;

use crate::generators::create_multires_table;

/// Named sky positions in degrees.
pub mod positions {
    /// Galactic centre, (l, b).
    pub const GALACTIC_CENTRE: (f64, f64) = (0.0, 0.0);

    /// North Galactic pole, (l, b).
    pub const NORTH_GALACTIC_POLE: (f64, f64) = (0.0, 90.0);

    /// North Galactic pole in ICRS, (ra, dec).
    pub const NORTH_GALACTIC_POLE_ICRS: (f64, f64) = (192.859_48, 27.128_25);

    /// Galactic centre in ICRS, (ra, dec).
    pub const GALACTIC_CENTRE_ICRS: (f64, f64) = (266.404_99, -28.936_17);

    /// A point just past the south pole (invalid latitude).
    pub const BEYOND_POLE: (f64, f64) = (0.0, -90.5);
}

/// Common distances in kiloparsecs.
pub mod distances {
    /// Distance modulus 10.
    pub const ONE_KPC: f64 = 1.0;

    /// Closer than the first bin of the standard grid (modulus 4).
    pub const TOO_CLOSE: f64 = 0.001;

    /// Farther than the last bin of the standard grid (modulus 19).
    pub const TOO_FAR: f64 = 1000.0;
}

/// The two-level scenario map.
///
/// Level nside=2 stores pixels 10, 20, 30 as rows 0, 1, 2. Level nside=4
/// stores pixels 5 and 15 as rows 3 and 4. Every other part of the sky is
/// uncovered.
pub fn scenario_table(n_samples: usize, n_bins: usize) -> PixelTable {
    create_multires_table(&[(2, &[10, 20, 30]), (4, &[5, 15])], n_samples, n_bins)
}

/// A map where one sky region is stored at two resolutions.
///
/// Row 0 is nside=2 pixel 2. Row 1 is nside=4 pixel 9, one of its children.
pub fn overlapping_table(n_samples: usize, n_bins: usize) -> PixelTable {
    create_multires_table(&[(2, &[2]), (4, &[9])], n_samples, n_bins)
}
