//! Bézier curve evaluation.

use crate::geo::{planar_distance_deg, GeoPoint};

/// Lift of the control point(s) as a fraction of the planar endpoint distance.
pub const CURVE_LIFT_FACTOR: f64 = 0.15;

/// Midpoint of two points, raised in latitude by [`CURVE_LIFT_FACTOR`].
fn lifted_midpoint(start: GeoPoint, end: GeoPoint) -> GeoPoint {
    let lift = planar_distance_deg(start, end) * CURVE_LIFT_FACTOR;
    GeoPoint::new((start.lat + end.lat) / 2.0 + lift, (start.lng + end.lng) / 2.0)
}

/// Quadratic Bézier arc with a single lifted control point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticCurve {
    pub start: GeoPoint,
    pub control: GeoPoint,
    pub end: GeoPoint,
}

impl QuadraticCurve {
    /// Build the arc between two endpoints.
    pub fn between(start: GeoPoint, end: GeoPoint) -> Self {
        Self {
            start,
            control: lifted_midpoint(start, end),
            end,
        }
    }

    /// Position at parameter `t`, clamped to `[0, 1]`.
    pub fn point_at(&self, t: f64) -> GeoPoint {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let a = u * u;
        let b = 2.0 * u * t;
        let c = t * t;
        GeoPoint::new(
            a * self.start.lat + b * self.control.lat + c * self.end.lat,
            a * self.start.lng + b * self.control.lng + c * self.end.lng,
        )
    }
}

/// Cubic Bézier arc whose two control points share the lifted midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicCurve {
    pub start: GeoPoint,
    pub control: GeoPoint,
    pub end: GeoPoint,
}

impl CubicCurve {
    /// Build the arc between two endpoints.
    pub fn between(start: GeoPoint, end: GeoPoint) -> Self {
        Self {
            start,
            control: lifted_midpoint(start, end),
            end,
        }
    }

    /// Position at parameter `t`, clamped to `[0, 1]`.
    pub fn point_at(&self, t: f64) -> GeoPoint {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let a = u * u * u;
        // Both control terms weight the same point.
        let b = 3.0 * u * u * t + 3.0 * u * t * t;
        let c = t * t * t;
        GeoPoint::new(
            a * self.start.lat + b * self.control.lat + c * self.end.lat,
            a * self.start.lng + b * self.control.lng + c * self.end.lng,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_endpoints_exact() {
        let curve = QuadraticCurve::between(GeoPoint::new(12.5, 77.1), GeoPoint::new(19.0, 72.8));
        assert_eq!(curve.point_at(0.0), curve.start);
        assert_eq!(curve.point_at(1.0), curve.end);
    }

    #[test]
    fn test_quadratic_control_lift() {
        let curve = QuadraticCurve::between(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0));
        let expected_lift = 2f64.sqrt() * CURVE_LIFT_FACTOR;
        assert!((curve.control.lat - (0.5 + expected_lift)).abs() < 1e-12);
        assert!((curve.control.lng - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_parameter_is_clamped() {
        let curve = QuadraticCurve::between(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0));
        assert_eq!(curve.point_at(-0.5), curve.start);
        assert_eq!(curve.point_at(1.5), curve.end);
    }

    #[test]
    fn test_cubic_midpoint_lift() {
        let curve = CubicCurve::between(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 2.0));
        // Horizontal leg: lift = 2 * 0.15 = 0.3; cubic at t=0.5 reaches 3/4 of it.
        let mid = curve.point_at(0.5);
        assert!((mid.lat - 0.225).abs() < 1e-12, "got {}", mid.lat);
        assert!((mid.lng - 1.0).abs() < 1e-12);
    }
}
