//! Leaderboard and public wall views over the routes store.

use tracing::debug;

use super::model::Route;
use super::store::{RouteQuery, RouteStore, StoreError};
use crate::timing::{estimate_times, SpeedProfile, TimeComparison};

/// Entries shown on the leaderboard.
pub const DEFAULT_LEADERBOARD_SIZE: usize = 3;

/// Entries shown on the public wall.
pub const DEFAULT_WALL_SIZE: usize = 4;

/// A public wall entry: a recent route with its estimated savings.
#[derive(Debug, Clone, PartialEq)]
pub struct WallEntry {
    pub route: Route,
    pub comparison: TimeComparison,
}

/// Most popular routes, falling back to the most recent when none has been
/// picked yet.
pub async fn leaderboard(store: &dyn RouteStore, size: usize) -> Result<Vec<Route>, StoreError> {
    let popular = store
        .fetch(&RouteQuery::popular().with_popularity_above(0).with_limit(size))
        .await?;
    if !popular.is_empty() {
        return Ok(popular);
    }

    debug!("No popular routes yet, leaderboard falls back to recent routes");
    store.fetch(&RouteQuery::recent().with_limit(size)).await
}

/// Most recent routes with distance-estimated driving savings.
pub async fn public_wall(
    store: &dyn RouteStore,
    size: usize,
    speeds: SpeedProfile,
) -> Result<Vec<WallEntry>, StoreError> {
    let routes = store.fetch(&RouteQuery::recent().with_limit(size)).await?;
    Ok(routes
        .into_iter()
        .map(|route| {
            let comparison = estimate_times(route.start(), route.end(), speeds);
            WallEntry { route, comparison }
        })
        .collect())
}
