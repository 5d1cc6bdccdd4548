//! Flying versus driving time comparison.
//!
//! Flying time always comes from the great-circle distance at a fixed cruise
//! speed. Driving time comes from a [`DirectionsService`] when one is
//! configured and answers; otherwise it is estimated from the same distance at
//! an average road speed. A failing directions lookup never aborts the caller.
//!
//! ```text
//! flying_minutes  = round(distance_km / 250 * 60)
//! driving_minutes = directions duration | round(distance_km / 60 * 60)
//! minutes_saved   = driving_minutes - flying_minutes   (may be negative)
//! ```

mod comparison;
mod directions;

pub use comparison::{
    compare_times, estimate_times, DrivingSource, SpeedProfile, TimeComparison,
    DEFAULT_DRIVING_SPEED_KMH, DEFAULT_FLYING_SPEED_KMH,
};
pub use directions::{
    fetch_driving_estimate, DirectionsError, DirectionsService, DrivingEstimate,
    HttpDirectionsService, DEFAULT_DIRECTIONS_ENDPOINT,
};

#[cfg(test)]
pub(crate) use directions::tests::MockDirections;
