//! Scoped event subscriptions.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::surface::{RenderError, RenderSurface, SubscriptionId, SurfaceEvent, SurfaceEventKind};

/// A live subscription that unsubscribes when dropped.
pub struct Subscription {
    surface: Arc<dyn RenderSurface>,
    id: SubscriptionId,
    kind: SurfaceEventKind,
}

impl Subscription {
    /// Subscribe `sink` to events of `kind` on `surface`.
    pub fn new(
        surface: Arc<dyn RenderSurface>,
        kind: SurfaceEventKind,
        sink: mpsc::UnboundedSender<SurfaceEvent>,
    ) -> Result<Self, RenderError> {
        let id = surface.subscribe(kind, sink)?;
        Ok(Self { surface, id, kind })
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn kind(&self) -> SurfaceEventKind {
        self.kind
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.surface.unsubscribe(self.id);
        tracing::debug!(kind = ?self.kind, "Surface subscription released");
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
