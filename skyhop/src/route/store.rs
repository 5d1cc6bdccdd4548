//! Pull-based routes store interface and an in-memory implementation.

use std::cmp::Reverse;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use parking_lot::RwLock;
use thiserror::Error;

use super::model::Route;
use crate::geo::GeoError;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors returned by a routes store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing service could not be reached.
    #[error("route store unavailable: {0}")]
    Unavailable(String),

    /// No route with the given id.
    #[error("route not found: {0}")]
    NotFound(String),

    /// A fetched record has invalid coordinates.
    #[error("route {id} is invalid: {source}")]
    InvalidRoute {
        id: String,
        #[source]
        source: GeoError,
    },

    /// I/O error while loading records.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Records could not be decoded.
    #[error("malformed route records: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordering applied by a store query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteOrder {
    /// Newest first.
    #[default]
    Recency,
    /// Most popular first, newest first among ties.
    Popularity,
}

impl std::str::FromStr for RouteOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recency" | "recent" => Ok(RouteOrder::Recency),
            "popularity" | "popular" => Ok(RouteOrder::Popularity),
            other => Err(format!("unknown route order '{}'", other)),
        }
    }
}

impl std::fmt::Display for RouteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteOrder::Recency => f.write_str("recency"),
            RouteOrder::Popularity => f.write_str("popularity"),
        }
    }
}

/// Caller-side ordering and filtering for a fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteQuery {
    pub order: RouteOrder,
    pub limit: Option<usize>,
    /// Only routes with popularity strictly greater than this.
    pub min_popularity: Option<u32>,
}

impl RouteQuery {
    /// Newest routes first.
    pub fn recent() -> Self {
        Self::default()
    }

    /// Most popular routes first.
    pub fn popular() -> Self {
        Self {
            order: RouteOrder::Popularity,
            ..Self::default()
        }
    }

    /// Cap the number of returned routes.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Keep only routes whose popularity exceeds `threshold`.
    pub fn with_popularity_above(mut self, threshold: u32) -> Self {
        self.min_popularity = Some(threshold);
        self
    }

    /// Apply this query to a set of routes.
    pub fn apply<'a>(&self, routes: impl IntoIterator<Item = &'a Route>) -> Vec<Route> {
        let mut selected: Vec<Route> = routes
            .into_iter()
            .filter(|r| self.min_popularity.map_or(true, |min| r.popularity > min))
            .cloned()
            .collect();

        match self.order {
            RouteOrder::Recency => selected.sort_by_key(|r| Reverse(r.created_at)),
            RouteOrder::Popularity => {
                selected.sort_by_key(|r| (Reverse(r.popularity), Reverse(r.created_at)))
            }
        }

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

/// External routes store.
///
/// Pull-only: every call returns a fresh snapshot, there is no push or
/// streaming. Implementations must be `Send + Sync` so the periodic refresh
/// task can share them.
pub trait RouteStore: Send + Sync {
    /// Fetch routes matching `query`.
    fn fetch(&self, query: &RouteQuery) -> BoxFuture<'_, Result<Vec<Route>, StoreError>>;

    /// Record that a route was picked, returning its new popularity.
    fn record_selection(&self, id: &str) -> BoxFuture<'_, Result<u32, StoreError>>;
}

/// Routes held in memory, optionally seeded from a JSON file.
#[derive(Debug, Default)]
pub struct MemoryRouteStore {
    routes: RwLock<Vec<Route>>,
}

impl MemoryRouteStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `routes`.
    pub fn with_routes(routes: Vec<Route>) -> Self {
        Self {
            routes: RwLock::new(routes),
        }
    }

    /// Load a JSON array of route records.
    ///
    /// Every record is validated; one bad record rejects the file.
    pub fn from_json_file(path: &Path) -> Result<Self, StoreError> {
        let text = std::fs::read_to_string(path)?;
        let routes: Vec<Route> = serde_json::from_str(&text)?;
        for route in &routes {
            route.validate().map_err(|source| StoreError::InvalidRoute {
                id: route.id.clone(),
                source,
            })?;
        }
        Ok(Self::with_routes(routes))
    }

    /// Add a route, replacing any route with the same id.
    pub fn insert(&self, route: Route) {
        let mut routes = self.routes.write();
        routes.retain(|r| r.id != route.id);
        routes.push(route);
    }

    /// Replace the whole route set.
    pub fn replace_all(&self, routes: Vec<Route>) {
        *self.routes.write() = routes;
    }

    /// Number of stored routes.
    pub fn len(&self) -> usize {
        self.routes.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.routes.read().is_empty()
    }
}

impl RouteStore for MemoryRouteStore {
    fn fetch(&self, query: &RouteQuery) -> BoxFuture<'_, Result<Vec<Route>, StoreError>> {
        let result = query.apply(self.routes.read().iter());
        Box::pin(async move { Ok(result) })
    }

    fn record_selection(&self, id: &str) -> BoxFuture<'_, Result<u32, StoreError>> {
        let result = {
            let mut routes = self.routes.write();
            match routes.iter_mut().find(|r| r.id == id) {
                Some(route) => {
                    route.popularity += 1;
                    Ok(route.popularity)
                }
                None => Err(StoreError::NotFound(id.to_string())),
            }
        };
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::NamedPoint;
    use chrono::{TimeZone, Utc};
    use std::io::Write;

    fn route(id: &str, created: i64, popularity: u32) -> Route {
        let mut r = Route::planned_at(
            NamedPoint::new("A", 12.0, 77.0),
            NamedPoint::new("B", 12.5, 77.5),
            5,
            Utc.timestamp_opt(created, 0).single().unwrap(),
        );
        r.id = id.to_string();
        r.popularity = popularity;
        r
    }

    #[test]
    fn test_recent_query_orders_newest_first() {
        let routes = vec![route("a", 10, 0), route("b", 30, 0), route("c", 20, 0)];
        let ids: Vec<String> = RouteQuery::recent()
            .apply(&routes)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_popular_query_filters_and_limits() {
        let routes = vec![
            route("a", 10, 5),
            route("b", 30, 0),
            route("c", 20, 9),
            route("d", 40, 5),
        ];
        let ids: Vec<String> = RouteQuery::popular()
            .with_popularity_above(0)
            .with_limit(2)
            .apply(&routes)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["c", "d"]);
    }

    #[test]
    fn test_route_order_parse() {
        assert_eq!("Recency".parse::<RouteOrder>(), Ok(RouteOrder::Recency));
        assert_eq!("popular".parse::<RouteOrder>(), Ok(RouteOrder::Popularity));
        assert!("sideways".parse::<RouteOrder>().is_err());
    }

    #[tokio::test]
    async fn test_memory_store_fetch_and_select() {
        let store = MemoryRouteStore::with_routes(vec![route("a", 10, 0), route("b", 20, 2)]);
        let fetched = store.fetch(&RouteQuery::recent()).await.unwrap();
        assert_eq!(fetched.len(), 2);

        assert_eq!(store.record_selection("b").await.unwrap(), 3);
        assert!(matches!(
            store.record_selection("zzz").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let store = MemoryRouteStore::new();
        store.insert(route("a", 10, 0));
        store.insert(route("a", 20, 4));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_from_json_file_rejects_invalid_coordinates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"bad","from":{{"name":"X","lat":95.0,"lng":0.0}},
                "to":{{"name":"Y","lat":1.0,"lng":1.0}},
                "created_at":"2025-01-01T00:00:00Z"}}]"#
        )
        .unwrap();

        let err = MemoryRouteStore::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRoute { .. }));
    }

    #[test]
    fn test_from_json_file_loads_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"r1","from":{{"name":"X","lat":12.9,"lng":77.6}},
                "to":{{"name":"Y","lat":13.1,"lng":77.7}},
                "created_at":"2025-01-01T00:00:00Z","duration":6}}]"#
        )
        .unwrap();

        let store = MemoryRouteStore::from_json_file(file.path()).unwrap();
        assert_eq!(store.len(), 1);
    }
}
