//! Query inputs: coordinates, optional distances, and the output mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sky_healpix::CoordFrame;

use crate::error::{LookupError, Result};
use crate::null_policy::QueryShape;

/// Sky positions in degrees, as one point or a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinates {
    Scalar { lon: f64, lat: f64 },
    Batch { lon: Vec<f64>, lat: Vec<f64> },
}

impl Coordinates {
    pub fn scalar(lon: f64, lat: f64) -> Self {
        Coordinates::Scalar { lon, lat }
    }

    pub fn batch(lon: Vec<f64>, lat: Vec<f64>) -> Self {
        Coordinates::Batch { lon, lat }
    }

    pub fn shape(&self) -> QueryShape {
        match self {
            Coordinates::Scalar { .. } => QueryShape::Scalar,
            Coordinates::Batch { .. } => QueryShape::Batch,
        }
    }

    /// Number of points (the longitude count for a batch).
    pub fn len(&self) -> usize {
        match self {
            Coordinates::Scalar { .. } => 1,
            Coordinates::Batch { lon, .. } => lon.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Galactic longitudes and latitudes of every point.
    pub fn to_galactic(&self, frame: CoordFrame) -> Result<(Vec<f64>, Vec<f64>)> {
        match self {
            Coordinates::Scalar { lon, lat } => {
                let (l, b) = frame.to_galactic(*lon, *lat);
                Ok((vec![l], vec![b]))
            }
            Coordinates::Batch { lon, lat } => {
                if lon.len() != lat.len() {
                    return Err(LookupError::CoordinateLengthMismatch {
                        lon: lon.len(),
                        lat: lat.len(),
                    });
                }
                Ok(lon
                    .iter()
                    .zip(lat)
                    .map(|(&lon, &lat)| frame.to_galactic(lon, lat))
                    .unzip())
            }
        }
    }
}

/// Distances in kiloparsecs at which profile fields are evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Distances {
    /// One distance applied to every point.
    Scalar(f64),
    /// One distance per point.
    PerPoint(Vec<f64>),
}

impl Distances {
    /// One distance per point for `n_points` points.
    pub fn expand(&self, n_points: usize) -> Result<Vec<f64>> {
        let distances = match self {
            Distances::Scalar(d) => vec![*d; n_points],
            Distances::PerPoint(d) => {
                if d.len() != n_points {
                    return Err(LookupError::DistanceLengthMismatch {
                        points: n_points,
                        distances: d.len(),
                    });
                }
                d.clone()
            }
        };

        if let Some(&bad) = distances.iter().find(|d| !d.is_finite() || **d < 0.0) {
            return Err(LookupError::InvalidDistance(bad));
        }
        Ok(distances)
    }
}

/// Which fields a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryMode {
    /// Best fit, all samples, GR, and per-pixel metadata.
    #[default]
    #[serde(rename = "full")]
    Full,
    /// Best fit plus median and spread instead of raw samples.
    #[serde(rename = "lite", alias = "summary")]
    Summary,
    /// The 2D SFD reddening stored for each pixel.
    #[serde(rename = "sfd", alias = "scalar")]
    ScalarField,
}

impl QueryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMode::Full => "full",
            QueryMode::Summary => "lite",
            QueryMode::ScalarField => "sfd",
        }
    }
}

impl FromStr for QueryMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(QueryMode::Full),
            "lite" | "summary" => Ok(QueryMode::Summary),
            "sfd" | "scalar" => Ok(QueryMode::ScalarField),
            other => Err(format!(
                "unknown mode '{}' (expected full, lite or sfd)",
                other
            )),
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete lookup request.
#[derive(Debug, Clone, PartialEq)]
pub struct DustQuery {
    pub coords: Coordinates,
    pub frame: CoordFrame,
    pub mode: QueryMode,
    /// When set, profile fields are evaluated at these distances.
    pub distances: Option<Distances>,
}

impl DustQuery {
    /// Full-mode query in Galactic coordinates over the whole distance grid.
    pub fn new(coords: Coordinates) -> Self {
        Self {
            coords,
            frame: CoordFrame::Galactic,
            mode: QueryMode::Full,
            distances: None,
        }
    }

    pub fn with_frame(mut self, frame: CoordFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_mode(mut self, mode: QueryMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_distances(mut self, distances: Distances) -> Self {
        self.distances = Some(distances);
        self
    }
}
