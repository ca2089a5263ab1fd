//! Rotation between the ICRS (equatorial J2000) and Galactic frames.
//!
//! The map is indexed in Galactic coordinates, so equatorial queries are
//! rotated before lookup. The rotation is a fixed orthonormal matrix; no
//! epoch or precession handling is needed.

use serde::{Deserialize, Serialize};

/// Rows are the Galactic x, y, z axes expressed in ICRS coordinates
/// (IAU 1958 definition, Liu, Zhu & Zhang 2011).
#[allow(clippy::excessive_precision)]
const ICRS_TO_GALACTIC: [[f64; 3]; 3] = [
    [
        -0.054875560416215368492398900454,
        -0.873437090234885048760383168409,
        -0.483835015548713226831774175116,
    ],
    [
        0.494109427875583673525222371358,
        -0.444829629960011178146614061616,
        0.746982244497218890527388004556,
    ],
    [
        -0.867666149019004701181616534570,
        -0.198076373431201528180486091412,
        0.455983776175066922272100478348,
    ],
];

/// Frame in which query coordinates are expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordFrame {
    /// Galactic (l, b). The native frame of the map.
    #[default]
    Galactic,
    /// Equatorial ICRS (ra, dec).
    Equatorial,
}

impl CoordFrame {
    /// Parse a frame name (case-insensitive): `gal`/`galactic` or `equ`/`equatorial`/`icrs`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "g" | "gal" | "galactic" => Some(Self::Galactic),
            "e" | "equ" | "equatorial" | "icrs" => Some(Self::Equatorial),
            _ => None,
        }
    }

    /// Convert (lon, lat) degrees in this frame to Galactic (l, b) degrees.
    pub fn to_galactic(&self, lon: f64, lat: f64) -> (f64, f64) {
        match self {
            Self::Galactic => (lon, lat),
            Self::Equatorial => icrs_to_galactic(lon, lat),
        }
    }
}

fn to_unit_vector(lon_deg: f64, lat_deg: f64) -> [f64; 3] {
    let (sin_lon, cos_lon) = lon_deg.to_radians().sin_cos();
    let (sin_lat, cos_lat) = lat_deg.to_radians().sin_cos();
    [cos_lon * cos_lat, sin_lon * cos_lat, sin_lat]
}

fn from_unit_vector(v: [f64; 3]) -> (f64, f64) {
    let d2 = v[0] * v[0] + v[1] * v[1];
    let lon = if d2 != 0.0 { v[1].atan2(v[0]) } else { 0.0 };
    let lat = v[2].atan2(d2.sqrt());
    (lon.to_degrees().rem_euclid(360.0), lat.to_degrees())
}

/// Rotate equatorial (ra, dec) degrees to Galactic (l, b) degrees.
///
/// `l` is returned in [0, 360).
pub fn icrs_to_galactic(ra: f64, dec: f64) -> (f64, f64) {
    let icrs = to_unit_vector(ra, dec);
    let m = &ICRS_TO_GALACTIC;
    let gal = [
        m[0][0] * icrs[0] + m[0][1] * icrs[1] + m[0][2] * icrs[2],
        m[1][0] * icrs[0] + m[1][1] * icrs[1] + m[1][2] * icrs[2],
        m[2][0] * icrs[0] + m[2][1] * icrs[1] + m[2][2] * icrs[2],
    ];
    from_unit_vector(gal)
}

/// Rotate Galactic (l, b) degrees to equatorial (ra, dec) degrees.
pub fn galactic_to_icrs(l: f64, b: f64) -> (f64, f64) {
    let gal = to_unit_vector(l, b);
    let m = &ICRS_TO_GALACTIC;
    // Transpose of the forward rotation.
    let icrs = [
        m[0][0] * gal[0] + m[1][0] * gal[1] + m[2][0] * gal[2],
        m[0][1] * gal[0] + m[1][1] * gal[1] + m[2][1] * gal[2],
        m[0][2] * gal[0] + m[1][2] * gal[1] + m[2][2] * gal[2],
    ];
    from_unit_vector(icrs)
}
