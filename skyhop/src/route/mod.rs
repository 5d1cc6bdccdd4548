//! Route records and the routes store.
//!
//! Routes are fetched from an external store, never mutated locally, and
//! replaced wholesale on every refetch. Each route carries a [`RouteKey`]
//! derived from its content so that overlay identity survives reordering of
//! fetch results.

mod model;
mod queries;
mod store;

pub use model::{Route, RouteKey};
pub use queries::{leaderboard, public_wall, WallEntry, DEFAULT_LEADERBOARD_SIZE, DEFAULT_WALL_SIZE};
pub use store::{BoxFuture, MemoryRouteStore, RouteOrder, RouteQuery, RouteStore, StoreError};
