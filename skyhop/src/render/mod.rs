//! Render surface abstraction.
//!
//! The map itself is external. This module describes the small capability set
//! the engine needs from it (sources, layers, paint properties, markers and
//! event subscriptions) and provides [`RecordingSurface`], an in-memory
//! implementation used for headless runs and tests.
//!
//! # Resource model
//!
//! ```text
//! Source ◄──── Layer (line | circle)      layers reference a source by id
//! Marker                                  free-standing, addressed by MarkerId
//! ```
//!
//! A source cannot be removed while a layer still references it; layers must
//! be detached first.

mod recording;
mod subscription;
mod surface;

pub use recording::{MarkerState, RecordingSurface, SurfaceOp};
pub use subscription::Subscription;
pub use surface::{
    LayerKind, LayerSpec, MarkerId, MarkerSpec, PaintValue, PointFeature, RenderError,
    RenderSurface, SourceData, SubscriptionId, SurfaceEvent, SurfaceEventKind,
};
