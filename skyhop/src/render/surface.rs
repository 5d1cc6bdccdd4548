//! Render surface capability trait and its value types.

use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::geo::GeoPoint;

/// Errors reported by a render surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("source already exists: {0}")]
    DuplicateSource(String),

    #[error("layer already exists: {0}")]
    DuplicateLayer(String),

    #[error("unknown source: {0}")]
    UnknownSource(String),

    #[error("unknown layer: {0}")]
    UnknownLayer(String),

    #[error("unknown marker: {0}")]
    UnknownMarker(MarkerId),

    /// A source was removed while a layer still draws from it.
    #[error("source {source_id} is still used by layer {layer_id}")]
    SourceInUse { source_id: String, layer_id: String },

    /// The surface has been released.
    #[error("render surface is no longer available")]
    SurfaceGone,
}

/// Handle to a marker on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "marker-{}", self.0)
    }
}

/// Handle to an event subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// A labelled point in a point source.
#[derive(Debug, Clone, PartialEq)]
pub struct PointFeature {
    pub position: GeoPoint,
    pub label: String,
}

impl PointFeature {
    pub fn new(position: GeoPoint, label: impl Into<String>) -> Self {
        Self {
            position,
            label: label.into(),
        }
    }
}

/// Geometry held by a source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceData {
    /// A single line string.
    Line(Vec<GeoPoint>),
    /// A collection of points.
    Points(Vec<PointFeature>),
}

/// How a layer draws its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Line,
    Circle,
}

/// A paint property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintValue {
    Number(f64),
    Color(String),
    /// Colour stops along the line, keyed by line progress in `[0, 1]`.
    Gradient(Vec<(f64, String)>),
}

/// Layer definition passed to [`RenderSurface::add_layer`].
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    pub kind: LayerKind,
    pub paint: Vec<(String, PaintValue)>,
}

impl LayerSpec {
    /// Start a layer definition drawing `source`.
    pub fn new(id: impl Into<String>, source: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            kind,
            paint: Vec::new(),
        }
    }

    /// Add a paint property.
    pub fn paint(mut self, name: &str, value: PaintValue) -> Self {
        self.paint.push((name.to_string(), value));
        self
    }
}

/// Marker definition passed to [`RenderSurface::create_marker`].
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: GeoPoint,
    /// Degrees clockwise from north, aligned to the map.
    pub rotation: f64,
    pub size_px: f64,
}

/// Events a surface can publish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    /// The base style finished loading; overlays may be added.
    StyleLoaded,
    /// The zoom level changed.
    Zoom(f64),
}

impl SurfaceEvent {
    pub fn kind(&self) -> SurfaceEventKind {
        match self {
            SurfaceEvent::StyleLoaded => SurfaceEventKind::StyleLoaded,
            SurfaceEvent::Zoom(_) => SurfaceEventKind::Zoom,
        }
    }
}

/// Event categories for subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceEventKind {
    StyleLoaded,
    Zoom,
}

/// Capabilities the engine needs from the external map.
///
/// All methods take `&self`; implementations use interior mutability so the
/// surface can be shared as `Arc<dyn RenderSurface>` between the animation
/// and the refresh paths.
pub trait RenderSurface: Send + Sync {
    /// Add a data source.
    fn add_source(&self, id: &str, data: SourceData) -> Result<(), RenderError>;

    /// Remove a data source. Fails while a layer still references it.
    fn remove_source(&self, id: &str) -> Result<(), RenderError>;

    /// Whether a source with this id exists.
    fn has_source(&self, id: &str) -> bool;

    /// Add a layer drawing an existing source.
    fn add_layer(&self, layer: LayerSpec) -> Result<(), RenderError>;

    /// Remove a layer.
    fn remove_layer(&self, id: &str) -> Result<(), RenderError>;

    /// Whether a layer with this id exists.
    fn has_layer(&self, id: &str) -> bool;

    /// Set a paint property on a layer.
    fn set_paint_property(&self, layer: &str, name: &str, value: PaintValue)
        -> Result<(), RenderError>;

    /// Create a marker.
    fn create_marker(&self, spec: MarkerSpec) -> Result<MarkerId, RenderError>;

    /// Move a marker.
    fn set_marker_position(&self, marker: MarkerId, position: GeoPoint) -> Result<(), RenderError>;

    /// Rotate a marker.
    fn set_marker_rotation(&self, marker: MarkerId, degrees: f64) -> Result<(), RenderError>;

    /// Resize a marker.
    fn set_marker_size(&self, marker: MarkerId, size_px: f64) -> Result<(), RenderError>;

    /// Remove a marker.
    fn remove_marker(&self, marker: MarkerId) -> Result<(), RenderError>;

    /// Deliver events of `kind` to `sink` until unsubscribed.
    fn subscribe(
        &self,
        kind: SurfaceEventKind,
        sink: mpsc::UnboundedSender<SurfaceEvent>,
    ) -> Result<SubscriptionId, RenderError>;

    /// Stop delivering events for a subscription. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}
