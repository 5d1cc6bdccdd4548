//! Overlay styling.

use crate::path::CurveMode;
use crate::render::PaintValue;

/// Colour of the active route.
pub const ACTIVE_ROUTE_COLOR: &str = "#a855f7";

/// Fully transparent variant of the active route colour.
pub const ACTIVE_ROUTE_TRANSPARENT: &str = "rgba(168, 85, 247, 0)";

/// Colour of public routes.
pub const PUBLIC_ROUTE_COLOR: &str = "#6366f1";

/// Colour of the driving route.
pub const DRIVING_ROUTE_COLOR: &str = "#ef4444";

/// Opacity of the driving route line.
pub const DRIVING_ROUTE_OPACITY: f64 = 0.75;

/// Base marker size in pixels at full zoom factor.
pub const MARKER_SIZE_PX: f64 = 50.0;

/// Zoom level at which sizes reach their full value.
const FULL_SIZE_ZOOM: f64 = 8.0;

/// Smallest size factor applied when zoomed out.
const MIN_ZOOM_FACTOR: f64 = 0.5;

/// Visual parameters for one route overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStyle {
    pub mode: CurveMode,
    pub color: String,
    pub line_width: f64,
    pub foreground_opacity: f64,
    pub background_opacity: f64,
    pub point_radius: f64,
    pub point_opacity: f64,
    /// Draw the traveled-path gradient on the foreground line.
    pub progress_gradient: bool,
    /// Create a vehicle marker at the start of the path.
    pub marker: bool,
}

impl RouteStyle {
    /// Style of the single animated route.
    pub fn active() -> Self {
        Self {
            mode: CurveMode::Quadratic,
            color: ACTIVE_ROUTE_COLOR.to_string(),
            line_width: 1.5,
            foreground_opacity: 1.0,
            background_opacity: 0.2,
            point_radius: 4.0,
            point_opacity: 0.8,
            progress_gradient: true,
            marker: true,
        }
    }

    /// Style of the background public routes.
    pub fn public() -> Self {
        Self {
            mode: CurveMode::Cubic,
            color: PUBLIC_ROUTE_COLOR.to_string(),
            line_width: 2.0,
            foreground_opacity: 0.3,
            background_opacity: 0.1,
            point_radius: 2.5,
            point_opacity: 0.5,
            progress_gradient: false,
            marker: false,
        }
    }
}

/// Smallest distance between adjacent gradient stops.
pub const GRADIENT_STOP_GAP: f64 = 1e-4;

/// Size factor for a zoom level: `clamp(zoom / 8, 0.5, 1)`.
pub fn zoom_factor(zoom: f64) -> f64 {
    if !zoom.is_finite() {
        return 1.0;
    }
    (zoom / FULL_SIZE_ZOOM).clamp(MIN_ZOOM_FACTOR, 1.0)
}

/// Line gradient revealing the path up to progress `t`.
///
/// Stops are `0` and `max(0, t - 0.01)` in `color`, then `min(1, t)` fully
/// transparent. Line-gradient interpolation needs strictly ascending stops, so
/// near the start each stop is kept at least [`GRADIENT_STOP_GAP`] past the
/// previous one.
pub fn progress_gradient(t: f64, color: &str) -> PaintValue {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let lead = (t - 0.01).max(GRADIENT_STOP_GAP);
    let tail = t.max(lead + GRADIENT_STOP_GAP);
    PaintValue::Gradient(vec![
        (0.0, color.to_string()),
        (lead, color.to_string()),
        (tail, ACTIVE_ROUTE_TRANSPARENT.to_string()),
    ])
}

/// Gradient applied when the active route is first drawn.
pub(crate) fn initial_gradient(color: &str) -> PaintValue {
    PaintValue::Gradient(vec![
        (0.0, color.to_string()),
        (0.01, color.to_string()),
        (0.02, ACTIVE_ROUTE_TRANSPARENT.to_string()),
    ])
}
