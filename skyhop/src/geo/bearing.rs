//! Initial great-circle bearing between two points.

use super::GeoPoint;

/// Calculate the bearing from `from` towards `to`.
///
/// Returns degrees in `[0, 360)`, where 0 = North, 90 = East.
///
/// Coincident points have no direction; they yield 0 rather than the
/// platform-dependent result of `atan2(0, 0)`.
pub fn bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let dlambda = (to.lng - from.lng).to_radians();

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();

    if (y == 0.0 && x == 0.0) || !y.is_finite() || !x.is_finite() {
        return 0.0;
    }

    let degrees = (y.atan2(x).to_degrees() + 360.0) % 360.0;

    // 360 - epsilon can round up to exactly 360.0
    if degrees >= 360.0 {
        0.0
    } else {
        degrees
    }
}
