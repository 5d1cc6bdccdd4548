//! In-memory render surface.
//!
//! Records every resource and operation so headless runs and tests can
//! inspect exactly what the engine asked the map to do.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::trace;

use super::surface::{
    LayerSpec, MarkerId, MarkerSpec, PaintValue, RenderError, RenderSurface, SourceData,
    SubscriptionId, SurfaceEvent, SurfaceEventKind,
};
use crate::geo::GeoPoint;

/// Current state of a marker on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerState {
    pub position: GeoPoint,
    pub rotation: f64,
    pub size_px: f64,
}

/// A mutating operation applied to a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    AddSource(String),
    RemoveSource(String),
    AddLayer(String),
    RemoveLayer(String),
    SetPaint { layer: String, name: String },
    CreateMarker(MarkerId),
    RemoveMarker(MarkerId),
}

#[derive(Default)]
struct SurfaceState {
    sources: HashMap<String, SourceData>,
    /// Layers in draw order.
    layers: Vec<LayerSpec>,
    markers: HashMap<MarkerId, MarkerState>,
    subscriptions: HashMap<SubscriptionId, (SurfaceEventKind, mpsc::UnboundedSender<SurfaceEvent>)>,
    ops: Vec<SurfaceOp>,
    next_marker: u64,
    next_subscription: u64,
}

impl SurfaceState {
    fn layer_mut(&mut self, id: &str) -> Option<&mut LayerSpec> {
        self.layers.iter_mut().find(|l| l.id == id)
    }
}

/// Render surface that keeps everything in memory.
#[derive(Default)]
pub struct RecordingSurface {
    state: Mutex<SurfaceState>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_count(&self) -> usize {
        self.state.lock().sources.len()
    }

    pub fn layer_count(&self) -> usize {
        self.state.lock().layers.len()
    }

    pub fn marker_count(&self) -> usize {
        self.state.lock().markers.len()
    }

    /// Total sources, layers and markers currently on the surface.
    pub fn resource_count(&self) -> usize {
        let state = self.state.lock();
        state.sources.len() + state.layers.len() + state.markers.len()
    }

    /// Layer ids in draw order.
    pub fn layer_ids(&self) -> Vec<String> {
        self.state.lock().layers.iter().map(|l| l.id.clone()).collect()
    }

    /// Source ids, sorted.
    pub fn source_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.state.lock().sources.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn source(&self, id: &str) -> Option<SourceData> {
        self.state.lock().sources.get(id).cloned()
    }

    pub fn layer(&self, id: &str) -> Option<LayerSpec> {
        self.state.lock().layers.iter().find(|l| l.id == id).cloned()
    }

    /// Current value of a layer paint property.
    pub fn paint(&self, layer: &str, name: &str) -> Option<PaintValue> {
        let state = self.state.lock();
        let layer = state.layers.iter().find(|l| l.id == layer)?;
        layer
            .paint
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn marker(&self, id: MarkerId) -> Option<MarkerState> {
        self.state.lock().markers.get(&id).cloned()
    }

    pub fn marker_ids(&self) -> Vec<MarkerId> {
        let mut ids: Vec<MarkerId> = self.state.lock().markers.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscriptions.len()
    }

    /// All mutating operations applied so far, oldest first.
    pub fn operations(&self) -> Vec<SurfaceOp> {
        self.state.lock().ops.clone()
    }

    /// Deliver an event to matching subscribers.
    ///
    /// Returns the number of subscribers that received it. Subscribers whose
    /// receiver has gone away are dropped.
    pub fn emit(&self, event: SurfaceEvent) -> usize {
        let mut state = self.state.lock();
        let kind = event.kind();
        let mut delivered = 0;
        state.subscriptions.retain(|_, (k, sink)| {
            if *k != kind {
                return true;
            }
            match sink.send(event) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });
        delivered
    }
}

impl RenderSurface for RecordingSurface {
    fn add_source(&self, id: &str, data: SourceData) -> Result<(), RenderError> {
        let mut state = self.state.lock();
        if state.sources.contains_key(id) {
            return Err(RenderError::DuplicateSource(id.to_string()));
        }
        state.sources.insert(id.to_string(), data);
        state.ops.push(SurfaceOp::AddSource(id.to_string()));
        trace!(source = id, "Source added");
        Ok(())
    }

    fn remove_source(&self, id: &str) -> Result<(), RenderError> {
        let mut state = self.state.lock();
        if !state.sources.contains_key(id) {
            return Err(RenderError::UnknownSource(id.to_string()));
        }
        if let Some(layer) = state.layers.iter().find(|l| l.source == id) {
            return Err(RenderError::SourceInUse {
                source_id: id.to_string(),
                layer_id: layer.id.clone(),
            });
        }
        state.sources.remove(id);
        state.ops.push(SurfaceOp::RemoveSource(id.to_string()));
        trace!(source = id, "Source removed");
        Ok(())
    }

    fn has_source(&self, id: &str) -> bool {
        self.state.lock().sources.contains_key(id)
    }

    fn add_layer(&self, layer: LayerSpec) -> Result<(), RenderError> {
        let mut state = self.state.lock();
        if state.layers.iter().any(|l| l.id == layer.id) {
            return Err(RenderError::DuplicateLayer(layer.id));
        }
        if !state.sources.contains_key(&layer.source) {
            return Err(RenderError::UnknownSource(layer.source));
        }
        trace!(layer = %layer.id, source = %layer.source, "Layer added");
        state.ops.push(SurfaceOp::AddLayer(layer.id.clone()));
        state.layers.push(layer);
        Ok(())
    }

    fn remove_layer(&self, id: &str) -> Result<(), RenderError> {
        let mut state = self.state.lock();
        let Some(index) = state.layers.iter().position(|l| l.id == id) else {
            return Err(RenderError::UnknownLayer(id.to_string()));
        };
        state.layers.remove(index);
        state.ops.push(SurfaceOp::RemoveLayer(id.to_string()));
        trace!(layer = id, "Layer removed");
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.state.lock().layers.iter().any(|l| l.id == id)
    }

    fn set_paint_property(
        &self,
        layer: &str,
        name: &str,
        value: PaintValue,
    ) -> Result<(), RenderError> {
        let mut state = self.state.lock();
        let spec = state
            .layer_mut(layer)
            .ok_or_else(|| RenderError::UnknownLayer(layer.to_string()))?;
        match spec.paint.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => spec.paint.push((name.to_string(), value)),
        }
        // Per-frame updates to one property collapse into a single entry.
        let op = SurfaceOp::SetPaint {
            layer: layer.to_string(),
            name: name.to_string(),
        };
        if state.ops.last() != Some(&op) {
            state.ops.push(op);
        }
        Ok(())
    }

    fn create_marker(&self, spec: MarkerSpec) -> Result<MarkerId, RenderError> {
        let mut state = self.state.lock();
        state.next_marker += 1;
        let id = MarkerId(state.next_marker);
        state.markers.insert(
            id,
            MarkerState {
                position: spec.position,
                rotation: spec.rotation,
                size_px: spec.size_px,
            },
        );
        state.ops.push(SurfaceOp::CreateMarker(id));
        trace!(marker = %id, "Marker created");
        Ok(id)
    }

    fn set_marker_position(&self, marker: MarkerId, position: GeoPoint) -> Result<(), RenderError> {
        let mut state = self.state.lock();
        let m = state
            .markers
            .get_mut(&marker)
            .ok_or(RenderError::UnknownMarker(marker))?;
        m.position = position;
        Ok(())
    }

    fn set_marker_rotation(&self, marker: MarkerId, degrees: f64) -> Result<(), RenderError> {
        let mut state = self.state.lock();
        let m = state
            .markers
            .get_mut(&marker)
            .ok_or(RenderError::UnknownMarker(marker))?;
        m.rotation = degrees;
        Ok(())
    }

    fn set_marker_size(&self, marker: MarkerId, size_px: f64) -> Result<(), RenderError> {
        let mut state = self.state.lock();
        let m = state
            .markers
            .get_mut(&marker)
            .ok_or(RenderError::UnknownMarker(marker))?;
        m.size_px = size_px;
        Ok(())
    }

    fn remove_marker(&self, marker: MarkerId) -> Result<(), RenderError> {
        let mut state = self.state.lock();
        if state.markers.remove(&marker).is_none() {
            return Err(RenderError::UnknownMarker(marker));
        }
        state.ops.push(SurfaceOp::RemoveMarker(marker));
        trace!(marker = %marker, "Marker removed");
        Ok(())
    }

    fn subscribe(
        &self,
        kind: SurfaceEventKind,
        sink: mpsc::UnboundedSender<SurfaceEvent>,
    ) -> Result<SubscriptionId, RenderError> {
        let mut state = self.state.lock();
        state.next_subscription += 1;
        let id = SubscriptionId(state.next_subscription);
        state.subscriptions.insert(id, (kind, sink));
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.state.lock().subscriptions.remove(&id);
    }
}
