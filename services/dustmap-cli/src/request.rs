//! Parsing and validation of query bodies.
//!
//! A body names either Galactic (`l`, `b`) or equatorial (`ra`, `dec`)
//! coordinates in degrees, each a number or an array of numbers, with an
//! optional `mode` and optional distances `d` in kpc.

use dust_lookup::{CoordFrame, Coordinates, Distances, DustQuery, QueryMode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default maximum number of coordinates in one body.
pub const DEFAULT_MAX_COORDS: usize = 5000;

/// Caller-input errors. Each one rejects the whole body.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("body must contain either 'l' and 'b', or 'ra' and 'dec'")]
    MissingCoordinates,

    #[error("body must not mix Galactic (l, b) and equatorial (ra, dec) coordinates")]
    MixedFrames,

    #[error("'{lon}' and '{lat}' must both be numbers or arrays of equal length")]
    ShapeMismatch { lon: &'static str, lat: &'static str },

    #[error("coordinates must be finite numbers")]
    NonFiniteCoordinate,

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("too many coordinates: {count} (maximum {max})")]
    TooManyCoordinates { count: usize, max: usize },

    #[error("distance {0} kpc is invalid: must be finite and non-negative")]
    InvalidDistance(f64),

    #[error("'d' has {distances} values for {points} coordinates")]
    DistanceCountMismatch { points: usize, distances: usize },

    #[error("unknown mode '{0}' (expected full, lite or sfd)")]
    UnknownMode(String),
}

/// A number or an array of numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Values {
    One(f64),
    Many(Vec<f64>),
}

impl Values {
    fn len(&self) -> usize {
        match self {
            Values::One(_) => 1,
            Values::Many(v) => v.len(),
        }
    }

    fn iter(&self) -> impl Iterator<Item = &f64> {
        match self {
            Values::One(v) => std::slice::from_ref(v).iter(),
            Values::Many(v) => v.iter(),
        }
    }
}

/// Raw query body as sent by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l: Option<Values>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<Values>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ra: Option<Values>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dec: Option<Values>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<Values>,
}

/// A validated body, ready for the lookup engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequest {
    pub query: DustQuery,
    /// Coordinate names and values as given, echoed in the response.
    pub echo: [(&'static str, Values); 2],
}

/// Limits applied to every body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub max_coords: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_coords: DEFAULT_MAX_COORDS,
        }
    }
}

impl QueryBody {
    /// Parse a JSON body.
    pub fn from_json(body: &str) -> Result<Self, RequestError> {
        serde_json::from_str(body).map_err(|e| RequestError::InvalidJson(e.to_string()))
    }

    /// Validate the body and build the query.
    pub fn validate(self, limits: &RequestLimits) -> Result<ParsedRequest, RequestError> {
        let (frame, (lon_name, lon), (lat_name, lat)) =
            match (self.l, self.b, self.ra, self.dec) {
                (Some(l), Some(b), None, None) => (CoordFrame::Galactic, ("l", l), ("b", b)),
                (None, None, Some(ra), Some(dec)) => {
                    (CoordFrame::Equatorial, ("ra", ra), ("dec", dec))
                }
                (l, b, ra, dec) if (l.is_some() || b.is_some()) && (ra.is_some() || dec.is_some()) => {
                    return Err(RequestError::MixedFrames)
                }
                _ => return Err(RequestError::MissingCoordinates),
            };

        let coords = match (&lon, &lat) {
            (Values::One(l), Values::One(b)) => Coordinates::scalar(*l, *b),
            (Values::Many(l), Values::Many(b)) if l.len() == b.len() => {
                Coordinates::batch(l.clone(), b.clone())
            }
            _ => {
                return Err(RequestError::ShapeMismatch {
                    lon: lon_name,
                    lat: lat_name,
                })
            }
        };

        if lon.iter().chain(lat.iter()).any(|v| !v.is_finite()) {
            return Err(RequestError::NonFiniteCoordinate);
        }
        if let Some(&bad) = lat.iter().find(|b| b.abs() > 90.0) {
            return Err(RequestError::LatitudeOutOfRange(bad));
        }
        if coords.len() > limits.max_coords {
            return Err(RequestError::TooManyCoordinates {
                count: coords.len(),
                max: limits.max_coords,
            });
        }

        let mode = match self.mode.as_deref() {
            Some(name) => name
                .parse::<QueryMode>()
                .map_err(|_| RequestError::UnknownMode(name.to_string()))?,
            None => QueryMode::Full,
        };

        let mut query = DustQuery::new(coords).with_frame(frame).with_mode(mode);

        if let Some(d) = self.d {
            if let Some(&bad) = d.iter().find(|d| !d.is_finite() || **d < 0.0) {
                return Err(RequestError::InvalidDistance(bad));
            }
            let distances = match d {
                Values::One(d) => Distances::Scalar(d),
                Values::Many(d) => {
                    if d.len() != query.coords.len() {
                        return Err(RequestError::DistanceCountMismatch {
                            points: query.coords.len(),
                            distances: d.len(),
                        });
                    }
                    Distances::PerPoint(d)
                }
            };
            query = query.with_distances(distances);
        }

        Ok(ParsedRequest {
            query,
            echo: [(lon_name, lon), (lat_name, lat)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<ParsedRequest, RequestError> {
        QueryBody::from_json(body)?.validate(&RequestLimits::default())
    }

    #[test]
    fn test_scalar_galactic_body() {
        let request = parse(r#"{"l": 90.0, "b": 10.0}"#).unwrap();
        assert_eq!(request.query.coords, Coordinates::scalar(90.0, 10.0));
        assert_eq!(request.query.frame, CoordFrame::Galactic);
        assert_eq!(request.query.mode, QueryMode::Full);
        assert_eq!(request.query.distances, None);
        assert_eq!(request.echo[0], ("l", Values::One(90.0)));
    }

    #[test]
    fn test_batch_equatorial_body_with_mode_and_distance() {
        let request =
            parse(r#"{"ra": [10, 20], "dec": [-5, 5], "mode": "lite", "d": [1.0, 2.5]}"#).unwrap();
        assert_eq!(
            request.query.coords,
            Coordinates::batch(vec![10.0, 20.0], vec![-5.0, 5.0])
        );
        assert_eq!(request.query.frame, CoordFrame::Equatorial);
        assert_eq!(request.query.mode, QueryMode::Summary);
        assert_eq!(
            request.query.distances,
            Some(Distances::PerPoint(vec![1.0, 2.5]))
        );
    }

    #[test]
    fn test_coordinate_errors() {
        assert_eq!(parse(r#"{"l": 1.0}"#), Err(RequestError::MissingCoordinates));
        assert_eq!(
            parse(r#"{"l": 1.0, "b": 2.0, "ra": 3.0}"#),
            Err(RequestError::MixedFrames)
        );
        assert_eq!(
            parse(r#"{"l": [1.0, 2.0], "b": [2.0]}"#),
            Err(RequestError::ShapeMismatch { lon: "l", lat: "b" })
        );
        assert_eq!(
            parse(r#"{"ra": 1.0, "dec": [2.0]}"#),
            Err(RequestError::ShapeMismatch {
                lon: "ra",
                lat: "dec"
            })
        );
        assert_eq!(
            parse(r#"{"l": 1.0, "b": 90.5}"#),
            Err(RequestError::LatitudeOutOfRange(90.5))
        );
        assert!(matches!(
            parse(r#"{"l": "north", "b": 2.0}"#),
            Err(RequestError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_limits_and_distances() {
        let limits = RequestLimits { max_coords: 2 };
        let body = QueryBody::from_json(r#"{"l": [1, 2, 3], "b": [0, 0, 0]}"#).unwrap();
        assert_eq!(
            body.validate(&limits),
            Err(RequestError::TooManyCoordinates { count: 3, max: 2 })
        );

        assert_eq!(
            parse(r#"{"l": 1.0, "b": 2.0, "d": -1}"#),
            Err(RequestError::InvalidDistance(-1.0))
        );
        assert_eq!(
            parse(r#"{"l": [1.0, 2.0], "b": [2.0, 3.0], "d": [1.0]}"#),
            Err(RequestError::DistanceCountMismatch {
                points: 2,
                distances: 1
            })
        );
        let request = parse(r#"{"l": [1.0, 2.0], "b": [2.0, 3.0], "d": 0.5}"#).unwrap();
        assert_eq!(request.query.distances, Some(Distances::Scalar(0.5)));
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(
            parse(r#"{"l": 1, "b": 2, "mode": "sfd"}"#).unwrap().query.mode,
            QueryMode::ScalarField
        );
        assert_eq!(
            parse(r#"{"l": 1, "b": 2, "mode": "median"}"#),
            Err(RequestError::UnknownMode("median".to_string()))
        );
    }
}
