//! Overlay lifecycle on the render surface.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use super::set::{OverlayId, OverlayNamespace, OverlayResources, OverlaySet};
use super::style::{
    initial_gradient, progress_gradient, zoom_factor, RouteStyle, DRIVING_ROUTE_COLOR,
    DRIVING_ROUTE_OPACITY, MARKER_SIZE_PX,
};
use crate::geo::GeoPoint;
use crate::path::PathSegment;
use crate::render::{
    LayerKind, LayerSpec, MarkerSpec, PaintValue, PointFeature, RenderError, RenderSurface,
    SourceData,
};
use crate::route::RouteKey;

/// Errors from overlay operations.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// The overlay already has resources; it must be removed first.
    #[error("overlay {route} already has resources")]
    DuplicateResource { route: String },

    /// The overlay has no marker to move.
    #[error("overlay {route} has no marker")]
    MissingMarker { route: String },

    /// No overlay with this id.
    #[error("no overlay for {route}")]
    UnknownRoute { route: String },

    /// A path without points cannot be drawn.
    #[error("overlay {route} has an empty path")]
    EmptyPath { route: String },

    #[error("render surface error: {0}")]
    Render(#[from] RenderError),
}

/// What `add_route` does when the overlay already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Return [`OverlayError::DuplicateResource`].
    Fail,
    /// Log a warning, remove the existing overlay and add again.
    Replace,
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            DuplicatePolicy::Fail
        } else {
            DuplicatePolicy::Replace
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::Fail => f.write_str("fail"),
            DuplicatePolicy::Replace => f.write_str("replace"),
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(DuplicatePolicy::Fail),
            "replace" => Ok(DuplicatePolicy::Replace),
            other => Err(format!("expected 'fail' or 'replace', got '{}'", other)),
        }
    }
}

/// Creates and removes route overlays on a shared render surface.
///
/// Owns the [`OverlaySet`]; every resource it creates is recorded there
/// before the next one is attempted, so a failure midway can be rolled back.
pub struct OverlayLayerManager {
    surface: Arc<dyn RenderSurface>,
    overlays: OverlaySet,
    policy: DuplicatePolicy,
    /// Size factor from the last zoom event, if any.
    zoom_factor: Option<f64>,
}

impl OverlayLayerManager {
    pub fn new(surface: Arc<dyn RenderSurface>) -> Self {
        Self::with_policy(surface, DuplicatePolicy::default())
    }

    pub fn with_policy(surface: Arc<dyn RenderSurface>, policy: DuplicatePolicy) -> Self {
        Self {
            surface,
            overlays: OverlaySet::new(),
            policy,
            zoom_factor: None,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn overlays(&self) -> &OverlaySet {
        &self.overlays
    }

    pub fn contains(&self, id: &OverlayId) -> bool {
        self.overlays.contains(id)
    }

    /// Total surface resources owned by all overlays.
    pub fn resource_count(&self) -> usize {
        self.overlays.resource_count()
    }

    /// Route keys rendered in `namespace`.
    pub fn rendered_keys(&self, namespace: OverlayNamespace) -> Vec<RouteKey> {
        self.overlays.keys_in(namespace)
    }

    /// Draw a route.
    ///
    /// Creates the line source with background and foreground layers, the
    /// start/end point layer, and a marker when the style asks for one.
    pub fn add_route(
        &mut self,
        id: &OverlayId,
        path: &PathSegment,
        style: &RouteStyle,
    ) -> Result<(), OverlayError> {
        if self.overlays.contains(id) {
            match self.policy {
                DuplicatePolicy::Fail => {
                    return Err(OverlayError::DuplicateResource {
                        route: id.to_string(),
                    })
                }
                DuplicatePolicy::Replace => {
                    warn!(route = %id, "Overlay already present, replacing");
                    self.remove_route(id)?;
                }
            }
        }

        let (Some(start), Some(end)) = (path.first(), path.last()) else {
            return Err(OverlayError::EmptyPath {
                route: id.to_string(),
            });
        };

        let mut resources = OverlayResources::default();
        match self.build(id, path, start, end, style, &mut resources) {
            Ok(()) => {
                debug!(route = %id, resources = resources.count(), "Overlay added");
                self.overlays.insert(id.clone(), resources);
                Ok(())
            }
            Err(e) => {
                warn!(route = %id, error = %e, "Overlay setup failed, rolling back");
                if let Err(cleanup) = self.teardown(&resources) {
                    warn!(route = %id, error = %cleanup, "Rollback incomplete");
                }
                Err(e)
            }
        }
    }

    fn build(
        &self,
        id: &OverlayId,
        path: &PathSegment,
        start: GeoPoint,
        end: GeoPoint,
        style: &RouteStyle,
        resources: &mut OverlayResources,
    ) -> Result<(), OverlayError> {
        let width = self.line_width(id, style);

        let line_source = id.resource("line-source");
        self.surface
            .add_source(&line_source, SourceData::Line(path.points().to_vec()))?;
        resources.sources.push(line_source.clone());

        let background = id.resource("line-bg");
        self.surface.add_layer(
            LayerSpec::new(&background, &line_source, LayerKind::Line)
                .paint("line-color", PaintValue::Color(style.color.clone()))
                .paint("line-width", PaintValue::Number(width))
                .paint("line-opacity", PaintValue::Number(style.background_opacity)),
        )?;
        resources.background_layer = Some(background);

        let foreground = id.resource("line");
        let mut spec = LayerSpec::new(&foreground, &line_source, LayerKind::Line)
            .paint("line-width", PaintValue::Number(width))
            .paint("line-opacity", PaintValue::Number(style.foreground_opacity));
        spec = if style.progress_gradient {
            spec.paint("line-gradient", initial_gradient(&style.color))
        } else {
            spec.paint("line-color", PaintValue::Color(style.color.clone()))
        };
        self.surface.add_layer(spec)?;
        resources.foreground_layer = Some(foreground);

        let points_source = id.resource("points-source");
        self.surface.add_source(
            &points_source,
            SourceData::Points(vec![
                PointFeature::new(start, "start"),
                PointFeature::new(end, "end"),
            ]),
        )?;
        resources.sources.push(points_source.clone());

        let points = id.resource("points");
        self.surface.add_layer(
            LayerSpec::new(&points, &points_source, LayerKind::Circle)
                .paint("circle-radius", PaintValue::Number(self.point_radius(id, style)))
                .paint("circle-color", PaintValue::Color(style.color.clone()))
                .paint("circle-opacity", PaintValue::Number(style.point_opacity)),
        )?;
        resources.points_layer = Some(points);

        if style.marker {
            let marker = self.surface.create_marker(MarkerSpec {
                position: start,
                rotation: 0.0,
                size_px: marker_size(self.zoom_factor.unwrap_or(1.0)),
            })?;
            resources.marker = Some(marker);
        }

        Ok(())
    }

    /// Draw the driving route for an existing overlay.
    pub fn add_driving_route(
        &mut self,
        id: &OverlayId,
        polyline: &[GeoPoint],
    ) -> Result<(), OverlayError> {
        let Some(existing) = self.overlays.get(id) else {
            return Err(OverlayError::UnknownRoute {
                route: id.to_string(),
            });
        };
        if existing.driving_layer.is_some() {
            return Err(OverlayError::DuplicateResource {
                route: id.to_string(),
            });
        }
        if polyline.len() < 2 {
            debug!(route = %id, points = polyline.len(), "Driving route too short, skipped");
            return Ok(());
        }

        let source = id.resource("driving-source");
        let layer = id.resource("driving");
        let width = 1.5 * self.active_factor(id);

        self.surface
            .add_source(&source, SourceData::Line(polyline.to_vec()))?;
        let added = self.surface.add_layer(
            LayerSpec::new(&layer, &source, LayerKind::Line)
                .paint("line-color", PaintValue::Color(DRIVING_ROUTE_COLOR.to_string()))
                .paint("line-width", PaintValue::Number(width))
                .paint("line-opacity", PaintValue::Number(DRIVING_ROUTE_OPACITY)),
        );
        if let Err(e) = added {
            if let Err(cleanup) = self.surface.remove_source(&source) {
                warn!(route = %id, error = %cleanup, "Driving source rollback failed");
            }
            return Err(e.into());
        }

        if let Some(entry) = self.overlays.get_mut(id) {
            entry.sources.push(source);
            entry.driving_layer = Some(layer);
        }
        debug!(route = %id, points = polyline.len(), "Driving route added");
        Ok(())
    }

    /// Remove every resource of an overlay.
    ///
    /// Returns `Ok(false)` when nothing was rendered for `id`. Resources are
    /// removed foreground, background, driving, points, marker, then sources.
    pub fn remove_route(&mut self, id: &OverlayId) -> Result<bool, OverlayError> {
        let Some(resources) = self.overlays.remove(id) else {
            return Ok(false);
        };
        self.teardown(&resources)?;
        debug!(route = %id, "Overlay removed");
        Ok(true)
    }

    /// Remove all overlays. Attempts every entry before reporting an error.
    pub fn remove_all(&mut self) -> Result<usize, OverlayError> {
        let ids = self.overlays.ids();
        let mut removed = 0;
        let mut first_error = None;
        for id in ids {
            match self.remove_route(&id) {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(route = %id, error = %e, "Overlay removal failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(removed),
        }
    }

    fn teardown(&self, resources: &OverlayResources) -> Result<(), OverlayError> {
        let mut first_error: Option<RenderError> = None;
        let mut note = |result: Result<(), RenderError>| {
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        };

        for layer in [
            &resources.foreground_layer,
            &resources.background_layer,
            &resources.driving_layer,
            &resources.points_layer,
        ]
        .into_iter()
        .flatten()
        {
            note(self.surface.remove_layer(layer));
        }
        if let Some(marker) = resources.marker {
            note(self.surface.remove_marker(marker));
        }
        for source in &resources.sources {
            note(self.surface.remove_source(source));
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Move and rotate the marker of an overlay.
    pub fn update_marker_pose(
        &self,
        id: &OverlayId,
        position: GeoPoint,
        bearing_deg: f64,
    ) -> Result<(), OverlayError> {
        let marker = self
            .overlays
            .get(id)
            .and_then(|r| r.marker)
            .ok_or_else(|| OverlayError::MissingMarker {
                route: id.to_string(),
            })?;
        self.surface.set_marker_position(marker, position)?;
        self.surface.set_marker_rotation(marker, bearing_deg)?;
        Ok(())
    }

    /// Reveal the foreground line up to progress `t`.
    pub fn update_progress(&self, id: &OverlayId, t: f64, color: &str) -> Result<(), OverlayError> {
        let layer = self
            .overlays
            .get(id)
            .and_then(|r| r.foreground_layer.as_deref())
            .ok_or_else(|| OverlayError::UnknownRoute {
                route: id.to_string(),
            })?;
        self.surface
            .set_paint_property(layer, "line-gradient", progress_gradient(t, color))?;
        Ok(())
    }

    /// Resize active-route overlays for a new zoom level.
    ///
    /// Public routes keep their fixed styling.
    pub fn apply_zoom(&mut self, zoom: f64) -> Result<(), OverlayError> {
        let factor = zoom_factor(zoom);
        self.zoom_factor = Some(factor);

        for id in self.overlays.ids() {
            if id.namespace != OverlayNamespace::Active {
                continue;
            }
            let Some(resources) = self.overlays.get(&id) else {
                continue;
            };
            let width = PaintValue::Number(1.5 * factor);
            for layer in [
                &resources.foreground_layer,
                &resources.background_layer,
                &resources.driving_layer,
            ]
            .into_iter()
            .flatten()
            {
                self.surface
                    .set_paint_property(layer, "line-width", width.clone())?;
            }
            if let Some(points) = &resources.points_layer {
                self.surface.set_paint_property(
                    points,
                    "circle-radius",
                    PaintValue::Number(3.0 * factor),
                )?;
            }
            if let Some(marker) = resources.marker {
                self.surface.set_marker_size(marker, marker_size(factor))?;
            }
        }
        debug!(zoom, factor, "Overlay sizes updated");
        Ok(())
    }

    fn active_factor(&self, id: &OverlayId) -> f64 {
        match id.namespace {
            OverlayNamespace::Active => self.zoom_factor.unwrap_or(1.0),
            OverlayNamespace::Public => 1.0,
        }
    }

    fn line_width(&self, id: &OverlayId, style: &RouteStyle) -> f64 {
        style.line_width * self.active_factor(id)
    }

    fn point_radius(&self, id: &OverlayId, style: &RouteStyle) -> f64 {
        match (id.namespace, self.zoom_factor) {
            // Zoom-adjusted radius only applies once a zoom event arrived.
            (OverlayNamespace::Active, Some(factor)) => 3.0 * factor,
            _ => style.point_radius,
        }
    }
}

fn marker_size(factor: f64) -> f64 {
    (MARKER_SIZE_PX * factor).min(MARKER_SIZE_PX)
}
