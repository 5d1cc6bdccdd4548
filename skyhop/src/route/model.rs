//! Route record and its stable key.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::geo::{GeoError, GeoPoint, NamedPoint};

/// Hex characters kept from the content digest.
const KEY_LEN: usize = 16;

/// Content-derived identity of a route.
///
/// Hash of the ordered endpoint pair plus the creation timestamp. Two fetches
/// of the same record always yield the same key regardless of their position
/// in the result set; swapping `from` and `to` yields a different key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteKey(String);

impl RouteKey {
    /// Derive the key for an endpoint pair created at `created_at`.
    pub fn derive(from: GeoPoint, to: GeoPoint, created_at: &DateTime<Utc>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(
            format!(
                "{:.6},{:.6}>{:.6},{:.6}@{}",
                from.lat,
                from.lng,
                to.lat,
                to.lng,
                created_at.timestamp_millis()
            )
            .as_bytes(),
        );
        let digest = hasher.finalize();
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        RouteKey(hex[..KEY_LEN].to_string())
    }

    /// The key as text, safe to embed in render resource ids.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A simulated short-hop route as returned by the routes store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Store-assigned identifier.
    pub id: String,
    /// Departure point.
    pub from: NamedPoint,
    /// Arrival point.
    pub to: NamedPoint,
    /// When the route was first planned.
    pub created_at: DateTime<Utc>,
    /// Stored flying time in minutes.
    #[serde(default, alias = "duration")]
    pub duration_minutes: u32,
    /// Number of times the route was picked from the public wall.
    #[serde(default)]
    pub popularity: u32,
}

impl Route {
    /// Build a fresh route between two endpoints, created now.
    pub fn planned(from: NamedPoint, to: NamedPoint, duration_minutes: u32) -> Self {
        Self::planned_at(from, to, duration_minutes, Utc::now())
    }

    /// Build a fresh route with an explicit creation time.
    pub fn planned_at(
        from: NamedPoint,
        to: NamedPoint,
        duration_minutes: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        let key = RouteKey::derive(from.point(), to.point(), &created_at);
        Self {
            id: format!("local-{}", key),
            from,
            to,
            created_at,
            duration_minutes,
            popularity: 0,
        }
    }

    /// Replace the store id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the popularity count.
    pub fn with_popularity(mut self, popularity: u32) -> Self {
        self.popularity = popularity;
        self
    }

    /// Stable content-derived key.
    pub fn key(&self) -> RouteKey {
        RouteKey::derive(self.from.point(), self.to.point(), &self.created_at)
    }

    /// Departure coordinate.
    pub fn start(&self) -> GeoPoint {
        self.from.point()
    }

    /// Arrival coordinate.
    pub fn end(&self) -> GeoPoint {
        self.to.point()
    }

    /// Validate both endpoints.
    pub fn validate(&self) -> Result<(), GeoError> {
        self.from.validate()?;
        self.to.validate()
    }

    /// Whether this route joins the same two points as `other`, in either
    /// direction, with every coordinate within `tolerance` degrees.
    pub fn same_endpoints(&self, other: &Route, tolerance: f64) -> bool {
        let (a, b) = (self.start(), self.end());
        let (c, d) = (other.start(), other.end());
        (a.approx_eq(&c, tolerance) && b.approx_eq(&d, tolerance))
            || (a.approx_eq(&d, tolerance) && b.approx_eq(&c, tolerance))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.from.name, self.to.name)
    }
}
