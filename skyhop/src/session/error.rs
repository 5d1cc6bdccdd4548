//! Session error type.

use thiserror::Error;

use crate::geo::GeoError;
use crate::overlay::OverlayError;
use crate::render::RenderError;
use crate::route::StoreError;

/// Errors from [`MapSession`](super::MapSession) operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid route: {0}")]
    InvalidRoute(#[from] GeoError),

    #[error("overlay error: {0}")]
    Overlay(#[from] OverlayError),

    #[error("routes store error: {0}")]
    Store(#[from] StoreError),

    #[error("render surface error: {0}")]
    Render(#[from] RenderError),

    /// The session was shut down.
    #[error("session is closed")]
    Closed,
}
