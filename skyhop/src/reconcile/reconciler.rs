//! Diffing refreshed route sets against rendered overlays.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::overlay::{OverlayId, OverlayLayerManager, RouteStyle};
use crate::path::generate;
use crate::route::{Route, RouteKey};

/// Per-axis tolerance when comparing route endpoints, in degrees.
pub const ENDPOINT_TOLERANCE_DEG: f64 = 1e-6;

/// Whether `candidate` joins the same endpoints as `active`, either way round.
pub fn is_active_twin(candidate: &Route, active: &Route, tolerance: f64) -> bool {
    candidate.same_endpoints(active, tolerance)
}

/// Changes needed to bring rendered public routes in line with a refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    /// Routes to draw, in candidate order.
    pub to_add: Vec<Route>,
    /// Rendered keys to remove, sorted.
    pub to_remove: Vec<RouteKey>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Apply the plan to the public namespace of `overlays`.
    ///
    /// Removals run first. A failing route is logged and counted, and the
    /// rest of the plan still runs.
    pub fn apply(self, overlays: &mut OverlayLayerManager, style: &RouteStyle) -> ApplyReport {
        let mut report = ApplyReport::default();

        for key in self.to_remove {
            let id = OverlayId::public(key);
            match overlays.remove_route(&id) {
                Ok(_) => report.removed += 1,
                Err(e) => {
                    warn!(route = %id, error = %e, "Failed to remove public route");
                    report.failed += 1;
                }
            }
        }

        for route in self.to_add {
            let id = OverlayId::public(route.key());
            let path = generate(route.start(), route.end(), style.mode);
            match overlays.add_route(&id, &path, style) {
                Ok(()) => report.added += 1,
                Err(e) => {
                    warn!(route = %id, name = %route, error = %e, "Failed to add public route");
                    report.failed += 1;
                }
            }
        }

        report
    }
}

/// Outcome of [`ReconcilePlan::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub added: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Computes [`ReconcilePlan`]s.
#[derive(Debug, Clone)]
pub struct RouteSetReconciler {
    tolerance: f64,
}

impl Default for RouteSetReconciler {
    fn default() -> Self {
        Self {
            tolerance: ENDPOINT_TOLERANCE_DEG,
        }
    }
}

impl RouteSetReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Routes from `candidates` that should be drawn as public overlays.
    ///
    /// Drops routes with invalid coordinates, repeats of an earlier key and
    /// routes joining the same endpoints as `active`.
    pub fn desired<'a>(&self, candidates: &'a [Route], active: Option<&Route>) -> Vec<&'a Route> {
        let mut seen = HashSet::new();
        candidates
            .iter()
            .filter(|route| {
                if let Err(e) = route.validate() {
                    warn!(route = %route.id, error = %e, "Skipping route with invalid coordinates");
                    return false;
                }
                if !seen.insert(route.key()) {
                    debug!(route = %route.id, "Skipping repeated route");
                    return false;
                }
                if let Some(active) = active {
                    if is_active_twin(route, active, self.tolerance) {
                        debug!(route = %route.id, "Skipping route matching the active route");
                        return false;
                    }
                }
                true
            })
            .collect()
    }

    /// Diff the desired set for `candidates` against `rendered` keys.
    pub fn reconcile(
        &self,
        candidates: &[Route],
        active: Option<&Route>,
        rendered: &[RouteKey],
    ) -> ReconcilePlan {
        let desired = self.desired(candidates, active);
        let desired_keys: HashSet<RouteKey> = desired.iter().map(|r| r.key()).collect();
        let rendered_keys: HashSet<&RouteKey> = rendered.iter().collect();

        let mut to_remove: Vec<RouteKey> = rendered
            .iter()
            .filter(|key| !desired_keys.contains(*key))
            .cloned()
            .collect();
        to_remove.sort();
        to_remove.dedup();

        let to_add = desired
            .into_iter()
            .filter(|route| !rendered_keys.contains(&route.key()))
            .cloned()
            .collect();

        ReconcilePlan { to_add, to_remove }
    }
}
