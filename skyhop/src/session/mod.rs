//! Map session controller.
//!
//! A [`MapSession`] owns everything that lives for one map view: the overlay
//! manager, the active route and its animation scheduler, the last fetched
//! public routes and the surface event subscriptions. It is created once,
//! shared behind an `Arc`, and torn down with [`MapSession::shutdown`].
//!
//! ```text
//!              ┌──────────── MapSession ────────────┐
//! frames ────► │ on_frame ──► scheduler ──► marker  │
//! timer  ────► │ refresh  ──► reconciler ──► public │──► RenderSurface
//! events ────► │ on_zoom  ──► overlay sizes         │
//! caller ────► │ plan_route / set_active_route      │
//!              └────────────────────────────────────┘
//! ```
//!
//! Active-route switches and public-route updates are serialised by an
//! [`OverlayLock`]: a switch waits for it, a refresh that finds it taken
//! defers to the next cycle.

mod controller;
mod error;
mod lock;

pub use controller::{MapSession, RefreshOutcome, RoutePlan, SessionConfig, DEFAULT_REFRESH_INTERVAL};
pub use error::SessionError;
pub use lock::{OverlayGuard, OverlayLock};
