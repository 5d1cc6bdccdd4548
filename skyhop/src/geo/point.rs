//! Latitude/longitude points and distance helpers.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;
/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;
/// Minimum valid longitude in degrees.
pub const MIN_LNG: f64 = -180.0;
/// Maximum valid longitude in degrees.
pub const MAX_LNG: f64 = 180.0;

/// Mean Earth radius used by [`haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Errors raised when validating coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Latitude outside [-90, 90] or not finite.
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180] or not finite.
    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),

    /// Text could not be parsed as a point.
    #[error("cannot parse point '{0}': expected LAT,LNG")]
    Parse(String),
}

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl GeoPoint {
    /// Create a point without range checks.
    ///
    /// Use [`GeoPoint::validated`] for untrusted input.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Create a point, rejecting out-of-range or non-finite values.
    pub fn validated(lat: f64, lng: f64) -> Result<Self, GeoError> {
        let point = Self { lat, lng };
        point.validate()?;
        Ok(point)
    }

    /// Check that the point lies inside the valid coordinate ranges.
    pub fn validate(&self) -> Result<(), GeoError> {
        if !self.lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&self.lat) {
            return Err(GeoError::InvalidLatitude(self.lat));
        }
        if !self.lng.is_finite() || !(MIN_LNG..=MAX_LNG).contains(&self.lng) {
            return Err(GeoError::InvalidLongitude(self.lng));
        }
        Ok(())
    }

    /// Whether both axes are within `tolerance` degrees of `other`.
    ///
    /// Each axis is compared independently; this is not a geodesic distance.
    pub fn approx_eq(&self, other: &GeoPoint, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() < tolerance && (self.lng - other.lng).abs() < tolerance
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

impl std::str::FromStr for GeoPoint {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| GeoError::Parse(s.to_string()))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| GeoError::Parse(s.to_string()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| GeoError::Parse(s.to_string()))?;
        GeoPoint::validated(lat, lng)
    }
}

/// A route endpoint: a point plus its display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedPoint {
    /// Display label (place or address).
    pub name: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl NamedPoint {
    /// Create a named point.
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
        }
    }

    /// The bare coordinate of this endpoint.
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    /// Validate the coordinate part.
    pub fn validate(&self) -> Result<(), GeoError> {
        self.point().validate()
    }
}

impl std::str::FromStr for NamedPoint {
    type Err = GeoError;

    /// Parses `NAME:LAT,LNG`, or a bare `LAT,LNG` (the name is then the coordinate text).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once(':') {
            Some((name, coords)) => {
                let point: GeoPoint = coords.parse()?;
                Ok(NamedPoint::new(name.trim(), point.lat, point.lng))
            }
            None => {
                let point: GeoPoint = s.parse()?;
                Ok(NamedPoint::new(s.trim(), point.lat, point.lng))
            }
        }
    }
}

impl From<&NamedPoint> for GeoPoint {
    fn from(named: &NamedPoint) -> Self {
        named.point()
    }
}

/// Straight-line distance in degree space.
pub fn planar_distance_deg(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = b.lat - a.lat;
    let dlng = b.lng - a.lng;
    (dlat * dlat + dlng * dlng).sqrt()
}

/// Great-circle distance in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}
