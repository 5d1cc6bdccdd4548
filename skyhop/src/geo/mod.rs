//! Geographic primitives.
//!
//! Points are plain latitude/longitude pairs in degrees. Two distance measures
//! are provided and they are deliberately not interchangeable:
//!
//! - [`planar_distance_deg`] treats degrees as a flat plane. It only drives the
//!   stylistic lift of curved paths, never anything physical.
//! - [`haversine_km`] is the great-circle distance used for travel-time estimates.

mod bearing;
mod point;

pub use bearing::bearing;
pub use point::{
    haversine_km, planar_distance_deg, GeoError, GeoPoint, NamedPoint, EARTH_RADIUS_KM, MAX_LAT,
    MAX_LNG, MIN_LAT, MIN_LNG,
};
