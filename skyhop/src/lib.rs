//! Skyhop - animated short-hop air routes on a map
//!
//! This library is the engine behind a map view that animates a vehicle
//! marker along a curved route while keeping a periodically refreshed set of
//! public routes drawn alongside it.
//!
//! # Architecture
//!
//! ```text
//! geo ─► path ─► animation ──┐
//!                            ├─► overlay ─► render (RenderSurface)
//! route ─► reconcile ────────┘
//!    ▲                       session (MapSession) drives all of the above
//! timing (flying vs driving)
//! ```
//!
//! The map itself and the routes store are external collaborators reached
//! through the [`render::RenderSurface`] and [`route::RouteStore`] traits.

pub mod animation;
pub mod config;
pub mod geo;
pub mod logging;
pub mod overlay;
pub mod path;
pub mod reconcile;
pub mod render;
pub mod route;
pub mod session;
pub mod timing;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
