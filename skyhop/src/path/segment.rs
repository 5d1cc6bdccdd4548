//! Sampled path segments.

use serde::Serialize;

use super::curve::{CubicCurve, QuadraticCurve};
use crate::geo::GeoPoint;

/// Number of sampling steps (Δt = 0.01, so 101 samples per sweep).
pub const SAMPLE_STEPS: u32 = 100;

/// Steps at each end of a cubic sweep that are emitted twice.
const CUBIC_EDGE_STEPS: u32 = 10;

/// Times the exact destination is appended to a cubic path.
pub const CLOSURE_REPEATS: usize = 3;

/// Curve shape used to sample a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CurveMode {
    /// One control point, 101 samples. Active route.
    Quadratic,
    /// Two control points, padded ends. Public routes.
    Cubic,
}

/// Ordered samples along a curved path.
///
/// The first sample is always the start point and the last sample is always
/// the end point, bit for bit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSegment {
    mode: CurveMode,
    points: Vec<GeoPoint>,
}

impl PathSegment {
    /// Curve mode this segment was sampled with.
    pub fn mode(&self) -> CurveMode {
        self.mode
    }

    /// All samples, start first.
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Segments always hold at least two samples.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First sample.
    pub fn first(&self) -> Option<GeoPoint> {
        self.points.first().copied()
    }

    /// Last sample.
    pub fn last(&self) -> Option<GeoPoint> {
        self.points.last().copied()
    }

    /// Whether this is the two-point fallback for coincident endpoints.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() == 2 && self.points[0] == self.points[1]
    }

    /// Coordinates in `[lng, lat]` order, as GeoJSON expects.
    pub fn to_lng_lat(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| [p.lng, p.lat]).collect()
    }

    /// Consume the segment, returning its samples.
    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }
}

/// Generate a curved path from `start` to `end`.
///
/// Coincident endpoints produce the degenerate segment `[start, end]` in
/// either mode instead of a sweep of identical samples.
pub fn generate(start: GeoPoint, end: GeoPoint, mode: CurveMode) -> PathSegment {
    if start == end {
        return PathSegment {
            mode,
            points: vec![start, end],
        };
    }

    let points = match mode {
        CurveMode::Quadratic => sample_quadratic(start, end),
        CurveMode::Cubic => sample_cubic(start, end),
    };

    PathSegment { mode, points }
}

fn step_t(i: u32) -> f64 {
    f64::from(i) / f64::from(SAMPLE_STEPS)
}

fn sample_quadratic(start: GeoPoint, end: GeoPoint) -> Vec<GeoPoint> {
    let curve = QuadraticCurve::between(start, end);
    let mut points: Vec<GeoPoint> = (0..=SAMPLE_STEPS).map(|i| curve.point_at(step_t(i))).collect();

    // Pin the endpoints against rounding in the Bézier sum.
    points[0] = start;
    let last = points.len() - 1;
    points[last] = end;
    points
}

fn sample_cubic(start: GeoPoint, end: GeoPoint) -> Vec<GeoPoint> {
    let curve = CubicCurve::between(start, end);
    let capacity = 1 + (SAMPLE_STEPS as usize + 1) + 2 * CUBIC_EDGE_STEPS as usize + CLOSURE_REPEATS;
    let mut points = Vec::with_capacity(capacity);

    points.push(start);
    for i in 0..=SAMPLE_STEPS {
        let p = curve.point_at(step_t(i));
        points.push(p);
        if i < CUBIC_EDGE_STEPS || i > SAMPLE_STEPS - CUBIC_EDGE_STEPS {
            points.push(p);
        }
    }
    points.extend(std::iter::repeat(end).take(CLOSURE_REPEATS));
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::CURVE_LIFT_FACTOR;

    // ─────────────────────────────────────────────────────────────────────────
    // Quadratic
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_quadratic_diagonal_scenario() {
        let start = GeoPoint::new(0.0, 0.0);
        let end = GeoPoint::new(1.0, 1.0);
        let path = generate(start, end, CurveMode::Quadratic);

        assert_eq!(path.len(), 101);
        assert_eq!(path.points()[0], start);
        assert_eq!(path.points()[100], end);

        // Control point sits distance * 0.15 above the chord midpoint; the
        // curve at t = 0.5 reaches half of that lift.
        let lift = 2f64.sqrt() * CURVE_LIFT_FACTOR;
        let mid = path.points()[50];
        assert!((mid.lng - 0.5).abs() < 1e-9);
        assert!((mid.lat - (0.5 + lift / 2.0)).abs() < 1e-9, "got {}", mid.lat);
        assert!(mid.lat > 0.5);
    }

    #[test]
    fn test_quadratic_lng_monotonic_for_eastbound_leg() {
        let path = generate(
            GeoPoint::new(12.9716, 77.5946),
            GeoPoint::new(13.1986, 79.5946),
            CurveMode::Quadratic,
        );
        let lngs: Vec<f64> = path.points().iter().map(|p| p.lng).collect();
        assert!(lngs.windows(2).all(|w| w[1] >= w[0]));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cubic
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_cubic_sample_layout() {
        let start = GeoPoint::new(18.52, 73.85);
        let end = GeoPoint::new(19.07, 72.87);
        let path = generate(start, end, CurveMode::Cubic);

        // 1 leading start + 101 sweep + 20 edge duplicates + 3 closing points.
        assert_eq!(path.len(), 125);
        assert_eq!(path.first(), Some(start));
        assert_eq!(path.last(), Some(end));

        let tail = &path.points()[path.len() - CLOSURE_REPEATS..];
        assert!(tail.iter().all(|p| *p == end));

        // Leading start, then t=0 emitted twice.
        assert_eq!(path.points()[1], path.points()[2]);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Degenerate input
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_zero_distance_is_degenerate() {
        let p = GeoPoint::new(28.6139, 77.2090);
        for mode in [CurveMode::Quadratic, CurveMode::Cubic] {
            let path = generate(p, p, mode);
            assert_eq!(path.len(), 2);
            assert!(path.is_degenerate());
            assert!(path.points().iter().all(|q| !q.lat.is_nan() && !q.lng.is_nan()));
        }
    }

    #[test]
    fn test_to_lng_lat_order() {
        let path = generate(GeoPoint::new(1.0, 2.0), GeoPoint::new(3.0, 4.0), CurveMode::Quadratic);
        let coords = path.to_lng_lat();
        assert_eq!(coords[0], [2.0, 1.0]);
        assert_eq!(coords[coords.len() - 1], [4.0, 3.0]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn endpoints_are_exact(
                lat1 in -85.0f64..85.0,
                lng1 in -179.0f64..179.0,
                lat2 in -85.0f64..85.0,
                lng2 in -179.0f64..179.0,
                cubic in any::<bool>(),
            ) {
                let start = GeoPoint::new(lat1, lng1);
                let end = GeoPoint::new(lat2, lng2);
                let mode = if cubic { CurveMode::Cubic } else { CurveMode::Quadratic };
                let path = generate(start, end, mode);

                prop_assert_eq!(path.first(), Some(start));
                prop_assert_eq!(path.last(), Some(end));
                prop_assert!(path.points().iter().all(|p| p.lat.is_finite() && p.lng.is_finite()));
            }
        }
    }
}
