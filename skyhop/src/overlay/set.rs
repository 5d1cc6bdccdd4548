//! Ownership records for rendered overlays.

use std::collections::HashMap;
use std::fmt;

use crate::render::MarkerId;
use crate::route::RouteKey;

/// Id namespace on the shared render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayNamespace {
    /// The single animated route.
    Active,
    /// Routes drawn from the refreshed public set.
    Public,
}

impl OverlayNamespace {
    pub fn prefix(&self) -> &'static str {
        match self {
            OverlayNamespace::Active => "active-route",
            OverlayNamespace::Public => "public-route",
        }
    }
}

/// Identity of one overlay entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverlayId {
    pub namespace: OverlayNamespace,
    pub key: RouteKey,
}

impl OverlayId {
    pub fn active(key: RouteKey) -> Self {
        Self {
            namespace: OverlayNamespace::Active,
            key,
        }
    }

    pub fn public(key: RouteKey) -> Self {
        Self {
            namespace: OverlayNamespace::Public,
            key,
        }
    }

    /// Surface resource id for a component of this overlay.
    pub fn resource(&self, suffix: &str) -> String {
        format!("{}-{}-{}", self.namespace.prefix(), self.key, suffix)
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.namespace.prefix(), self.key)
    }
}

/// Surface resources owned by one overlay.
///
/// Fields are filled in as resources are created, so a partially built
/// entry describes exactly what has to be torn down.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayResources {
    pub foreground_layer: Option<String>,
    pub background_layer: Option<String>,
    pub driving_layer: Option<String>,
    pub points_layer: Option<String>,
    pub marker: Option<MarkerId>,
    /// Backing sources in creation order.
    pub sources: Vec<String>,
}

impl OverlayResources {
    /// Number of surface resources owned.
    pub fn count(&self) -> usize {
        [
            &self.foreground_layer,
            &self.background_layer,
            &self.driving_layer,
            &self.points_layer,
        ]
        .iter()
        .filter(|l| l.is_some())
        .count()
            + usize::from(self.marker.is_some())
            + self.sources.len()
    }

    /// Layer and source ids owned, in removal order.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = [
            &self.foreground_layer,
            &self.background_layer,
            &self.driving_layer,
            &self.points_layer,
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect();
        ids.extend(self.sources.iter().cloned());
        ids
    }
}

/// Mapping from overlay id to the resources it owns.
#[derive(Debug, Default)]
pub struct OverlaySet {
    entries: HashMap<OverlayId, OverlayResources>,
}

impl OverlaySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &OverlayId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &OverlayId) -> Option<&OverlayResources> {
        self.entries.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &OverlayId) -> Option<&mut OverlayResources> {
        self.entries.get_mut(id)
    }

    pub(crate) fn insert(&mut self, id: OverlayId, resources: OverlayResources) {
        self.entries.insert(id, resources);
    }

    pub(crate) fn remove(&mut self, id: &OverlayId) -> Option<OverlayResources> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All overlay ids, in no particular order.
    pub fn ids(&self) -> Vec<OverlayId> {
        self.entries.keys().cloned().collect()
    }

    /// Route keys rendered in one namespace.
    pub fn keys_in(&self, namespace: OverlayNamespace) -> Vec<RouteKey> {
        self.entries
            .keys()
            .filter(|id| id.namespace == namespace)
            .map(|id| id.key.clone())
            .collect()
    }

    /// Total surface resources owned across all entries.
    pub fn resource_count(&self) -> usize {
        self.entries.values().map(OverlayResources::count).sum()
    }
}
