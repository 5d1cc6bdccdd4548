//! Driving directions lookup.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::geo::GeoPoint;
use crate::route::BoxFuture;

/// Mapbox-compatible driving directions endpoint.
pub const DEFAULT_DIRECTIONS_ENDPOINT: &str = "https://api.mapbox.com/directions/v5/mapbox/driving";

/// Default request timeout for directions lookups.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from a directions lookup.
#[derive(Debug, Clone, Error)]
pub enum DirectionsError {
    /// Transport failure.
    #[error("directions request failed: {0}")]
    Http(String),

    /// Non-success HTTP status.
    #[error("directions service returned HTTP {0}")]
    Status(u16),

    /// Response body could not be decoded.
    #[error("malformed directions response: {0}")]
    Malformed(String),

    /// The service found no drivable route.
    #[error("no driving route between the given points")]
    NoRoute,
}

/// Result of a driving directions lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrivingEstimate {
    /// Driving time, when the service reports one.
    pub duration_minutes: Option<u32>,
    /// Road geometry, possibly empty.
    pub polyline: Vec<GeoPoint>,
}

/// Optional external directions provider.
pub trait DirectionsService: Send + Sync {
    /// Look up a driving route between two points.
    fn driving(
        &self,
        from: GeoPoint,
        to: GeoPoint,
    ) -> BoxFuture<'_, Result<DrivingEstimate, DirectionsError>>;
}

/// Query `service` if present, degrading to `None` on any failure.
pub async fn fetch_driving_estimate(
    service: Option<&dyn DirectionsService>,
    from: GeoPoint,
    to: GeoPoint,
) -> Option<DrivingEstimate> {
    let service = service?;
    match service.driving(from, to).await {
        Ok(estimate) => {
            debug!(
                duration_minutes = ?estimate.duration_minutes,
                points = estimate.polyline.len(),
                "Driving directions received"
            );
            Some(estimate)
        }
        Err(e) => {
            warn!(error = %e, "Directions lookup failed, using distance estimate");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    /// Seconds.
    duration: Option<f64>,
    geometry: Option<LineGeometry>,
}

#[derive(Debug, Deserialize)]
struct LineGeometry {
    #[serde(default)]
    coordinates: Vec<[f64; 2]>,
}

/// Build the request URL for a driving lookup.
fn directions_url(endpoint: &str, access_token: &str, from: GeoPoint, to: GeoPoint) -> String {
    format!(
        "{}/{},{};{},{}?geometries=geojson&access_token={}",
        endpoint.trim_end_matches('/'),
        from.lng,
        from.lat,
        to.lng,
        to.lat,
        access_token
    )
}

/// Decode a directions response body.
fn parse_directions(body: &[u8]) -> Result<DrivingEstimate, DirectionsError> {
    let response: DirectionsResponse =
        serde_json::from_slice(body).map_err(|e| DirectionsError::Malformed(e.to_string()))?;

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or(DirectionsError::NoRoute)?;

    let duration_minutes = route
        .duration
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| (secs / 60.0).round() as u32);

    let polyline = route
        .geometry
        .map(|g| {
            g.coordinates
                .into_iter()
                .map(|[lng, lat]| GeoPoint::new(lat, lng))
                .collect()
        })
        .unwrap_or_default();

    Ok(DrivingEstimate {
        duration_minutes,
        polyline,
    })
}

/// Directions over HTTP using reqwest.
pub struct HttpDirectionsService {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl HttpDirectionsService {
    /// Create a client for `endpoint` authenticated with `access_token`.
    pub fn new(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, DirectionsError> {
        Self::with_timeout(endpoint, access_token, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DirectionsError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DirectionsError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            access_token: access_token.into(),
        })
    }
}

impl DirectionsService for HttpDirectionsService {
    fn driving(
        &self,
        from: GeoPoint,
        to: GeoPoint,
    ) -> BoxFuture<'_, Result<DrivingEstimate, DirectionsError>> {
        // The URL carries the access token; errors are reported without it.
        let url = directions_url(&self.endpoint, &self.access_token, from, to);
        Box::pin(async move {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| DirectionsError::Http(e.without_url().to_string()))?;

            if !response.status().is_success() {
                return Err(DirectionsError::Status(response.status().as_u16()));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| {
                    DirectionsError::Http(format!("failed to read response: {}", e.without_url()))
                })?;
            parse_directions(&body)
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Directions stub returning a fixed result.
    pub struct MockDirections {
        pub response: Result<DrivingEstimate, DirectionsError>,
    }

    impl DirectionsService for MockDirections {
        fn driving(
            &self,
            _from: GeoPoint,
            _to: GeoPoint,
        ) -> BoxFuture<'_, Result<DrivingEstimate, DirectionsError>> {
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    #[test]
    fn test_directions_url_uses_lng_lat_order() {
        let url = directions_url(
            "https://example.com/driving/",
            "pk.test",
            GeoPoint::new(12.5, 77.5),
            GeoPoint::new(13.0, 78.0),
        );
        assert_eq!(
            url,
            "https://example.com/driving/77.5,12.5;78,13?geometries=geojson&access_token=pk.test"
        );
    }

    #[test]
    fn test_parse_directions() {
        let body = br#"{"routes":[{"duration":1830.0,
            "geometry":{"coordinates":[[77.5,12.5],[77.6,12.7],[78.0,13.0]]}}]}"#;
        let estimate = parse_directions(body).unwrap();
        assert_eq!(estimate.duration_minutes, Some(31));
        assert_eq!(estimate.polyline.len(), 3);
        assert_eq!(estimate.polyline[0], GeoPoint::new(12.5, 77.5));
    }

    #[test]
    fn test_parse_directions_without_routes() {
        let err = parse_directions(br#"{"routes":[]}"#).unwrap_err();
        assert!(matches!(err, DirectionsError::NoRoute));

        let err = parse_directions(b"not json").unwrap_err();
        assert!(matches!(err, DirectionsError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_transport_error_omits_access_token() {
        let service = HttpDirectionsService::with_timeout(
            "http://127.0.0.1:1/driving",
            "pk.SECRET123",
            Duration::from_secs(2),
        )
        .unwrap();

        let err = service
            .driving(GeoPoint::new(12.5, 77.5), GeoPoint::new(13.0, 78.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectionsError::Http(_)));

        let text = err.to_string();
        assert!(!text.contains("pk.SECRET123"), "token leaked: {}", text);
        assert!(!text.contains("access_token"), "query leaked: {}", text);
    }

    #[tokio::test]
    async fn test_fetch_degrades_on_failure() {
        let failing = MockDirections {
            response: Err(DirectionsError::Status(503)),
        };
        let from = GeoPoint::new(12.5, 77.5);
        let to = GeoPoint::new(13.0, 78.0);

        assert!(fetch_driving_estimate(Some(&failing), from, to).await.is_none());
        assert!(fetch_driving_estimate(None, from, to).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_passes_through_success() {
        let ok = MockDirections {
            response: Ok(DrivingEstimate {
                duration_minutes: Some(42),
                polyline: Vec::new(),
            }),
        };
        let estimate = fetch_driving_estimate(
            Some(&ok),
            GeoPoint::new(12.5, 77.5),
            GeoPoint::new(13.0, 78.0),
        )
        .await
        .unwrap();
        assert_eq!(estimate.duration_minutes, Some(42));
    }
}
