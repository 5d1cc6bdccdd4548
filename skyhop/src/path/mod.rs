//! Curved flight paths between two points.
//!
//! Paths are Bézier arcs in degree space. The arc is lifted northwards by a
//! fraction of the planar distance between the endpoints; the lift is purely
//! visual and has nothing to do with altitude.
//!
//! # Modes
//!
//! ```text
//! Quadratic: one control point (midpoint + lift), 101 samples
//!            used for the active route and its animation
//! Cubic:     two coincident control points (midpoint + lift)
//!            doubled samples near both ends, destination repeated 3×
//!            used for background/public routes
//! ```
//!
//! Both modes guarantee `first == start` and `last == end` exactly.

mod curve;
mod segment;

pub use curve::{CubicCurve, QuadraticCurve, CURVE_LIFT_FACTOR};
pub use segment::{generate, CurveMode, PathSegment, CLOSURE_REPEATS, SAMPLE_STEPS};
