//! Route overlays on the render surface.
//!
//! Every rendered route owns a fixed bundle of surface resources, tracked in
//! an [`OverlaySet`] entry so it can be torn down completely:
//!
//! ```text
//! {ns}-{key}-line-source ◄── {ns}-{key}-line-bg      background line
//!                        ◄── {ns}-{key}-line         foreground line (gradient on active)
//! {ns}-{key}-driving-source ◄── {ns}-{key}-driving   optional driving route
//! {ns}-{key}-points-source  ◄── {ns}-{key}-points    start / end circles
//! marker                                             active route only
//! ```
//!
//! The active route and the public routes draw ids from disjoint namespaces
//! ([`OverlayNamespace`]), so the two never collide on the shared surface.

mod manager;
mod set;
mod style;

pub use manager::{DuplicatePolicy, OverlayError, OverlayLayerManager};
pub use set::{OverlayId, OverlayNamespace, OverlayResources, OverlaySet};
pub use style::{
    progress_gradient, zoom_factor, RouteStyle, ACTIVE_ROUTE_COLOR, DRIVING_ROUTE_COLOR,
    PUBLIC_ROUTE_COLOR,
};
