//! Shared test utilities for the dustmap workspace.
//!
//! Everything the dustmap crates share in their tests:
//! - Synthetic multi-resolution map generators
//! - Pre-built fixture maps and sky positions
//! - Helpers for writing maps to temporary artifacts
//!
//! # Usage
//!
//! Depend on it from `[dev-dependencies]` with a path dependency, then:
//!
//! ```ignore
//! use test_utils::{fixtures, create_full_sky_table};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro to skip a test if no real map artifact is available.
///
/// Looks for the directory named by `DUSTMAP_TEST_MAP`, then for
/// `testdata/<name>` under the workspace root.
///
/// # Usage
///
/// ```ignore
/// use test_utils::require_test_map;
///
/// #[test]
/// fn test_against_real_map() {
///     let path = require_test_map!("bayestar.zarr");
///     let map = DustMap::open(&path, LookupConfig::default()).unwrap();
/// }
/// ```
#[macro_export]
macro_rules! require_test_map {
    ($name:expr) => {{
        match $crate::find_test_map($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: Map '{}' not found. Set DUSTMAP_TEST_MAP or add it to testdata/.",
                    $name
                );
                return;
            }
        }
    }};
}

/// Asserts that two numbers differ by at most `epsilon`.
///
/// Both sides are widened to `f64`, so `f32` table values can be compared
/// with `f64` results directly.
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(0.12345_f32, 0.1234_f64, 1e-4);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let actual = $actual as f64;
        let expected = $expected as f64;
        let tolerance = $tolerance as f64;
        if !((actual - expected).abs() <= tolerance) {
            panic!(
                "values not within {:e}: actual {:?}, expected {:?} (diff {:e})",
                tolerance,
                actual,
                expected,
                (actual - expected).abs()
            );
        }
    }};
}

/// Macro for approximate equality of sky positions in degrees.
///
/// Longitudes are compared modulo 360.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_lonlat_approx_eq;
///
/// assert_lonlat_approx_eq!((359.9999, 2.0001), (0.0, 2.0), 0.001);
/// ```
#[macro_export]
macro_rules! assert_lonlat_approx_eq {
    (($lon1:expr, $lat1:expr), ($lon2:expr, $lat2:expr), $epsilon:expr) => {{
        let dlon: f64 = ($lon1 as f64 - $lon2 as f64).rem_euclid(360.0);
        $crate::assert_approx_eq!(dlon.min(360.0 - dlon), 0.0, $epsilon);
        $crate::assert_approx_eq!($lat1, $lat2, $epsilon);
    }};
}
