//! Time comparison arithmetic.

use serde::Serialize;

use super::directions::DrivingEstimate;
use crate::geo::{haversine_km, GeoPoint};

/// Cruise speed of the simulated eVTOL.
pub const DEFAULT_FLYING_SPEED_KMH: f64 = 250.0;

/// Average road speed used when no directions are available.
pub const DEFAULT_DRIVING_SPEED_KMH: f64 = 60.0;

/// Speeds used to turn distance into minutes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedProfile {
    pub flying_kmh: f64,
    pub driving_kmh: f64,
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self {
            flying_kmh: DEFAULT_FLYING_SPEED_KMH,
            driving_kmh: DEFAULT_DRIVING_SPEED_KMH,
        }
    }
}

/// Where the driving figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DrivingSource {
    Directions,
    Estimate,
}

/// Derived flying/driving comparison for a route.
///
/// `minutes_saved` is not clamped: it is negative when driving is faster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeComparison {
    /// Great-circle distance, rounded to whole kilometres.
    pub distance_km: u32,
    pub flying_minutes: u32,
    pub driving_minutes: u32,
    pub minutes_saved: i64,
    pub driving_source: DrivingSource,
}

fn minutes_at(distance_km: u32, speed_kmh: f64) -> u32 {
    if speed_kmh <= 0.0 || !speed_kmh.is_finite() {
        return 0;
    }
    (f64::from(distance_km) / speed_kmh * 60.0).round() as u32
}

fn distance_km(from: GeoPoint, to: GeoPoint) -> u32 {
    haversine_km(from, to).round() as u32
}

/// Compare times using the distance-based estimate for driving.
pub fn estimate_times(from: GeoPoint, to: GeoPoint, speeds: SpeedProfile) -> TimeComparison {
    compare_times(from, to, speeds, None)
}

/// Compare times, preferring the directions duration when one is known.
pub fn compare_times(
    from: GeoPoint,
    to: GeoPoint,
    speeds: SpeedProfile,
    driving: Option<&DrivingEstimate>,
) -> TimeComparison {
    let distance_km = distance_km(from, to);
    let flying_minutes = minutes_at(distance_km, speeds.flying_kmh);

    let (driving_minutes, driving_source) = match driving.and_then(|d| d.duration_minutes) {
        Some(minutes) => (minutes, DrivingSource::Directions),
        None => (
            minutes_at(distance_km, speeds.driving_kmh),
            DrivingSource::Estimate,
        ),
    };

    TimeComparison {
        distance_km,
        flying_minutes,
        driving_minutes,
        minutes_saved: i64::from(driving_minutes) - i64::from(flying_minutes),
        driving_source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BENGALURU: GeoPoint = GeoPoint::new(12.9716, 77.5946);
    const MUMBAI: GeoPoint = GeoPoint::new(19.0760, 72.8777);

    #[test]
    fn test_bengaluru_mumbai_estimate() {
        let cmp = estimate_times(BENGALURU, MUMBAI, SpeedProfile::default());
        assert_eq!(cmp.distance_km, 845);
        // round(845 / 250 * 60) = round(202.8)
        assert_eq!(cmp.flying_minutes, 203);
        assert_eq!(cmp.driving_minutes, 845);
        assert_eq!(cmp.minutes_saved, 845 - 203);
        assert_eq!(cmp.driving_source, DrivingSource::Estimate);
    }

    #[test]
    fn test_directions_duration_wins() {
        let driving = DrivingEstimate {
            duration_minutes: Some(900),
            polyline: Vec::new(),
        };
        let cmp = compare_times(BENGALURU, MUMBAI, SpeedProfile::default(), Some(&driving));
        assert_eq!(cmp.driving_minutes, 900);
        assert_eq!(cmp.driving_source, DrivingSource::Directions);
    }

    #[test]
    fn test_missing_duration_falls_back() {
        let driving = DrivingEstimate {
            duration_minutes: None,
            polyline: vec![BENGALURU, MUMBAI],
        };
        let cmp = compare_times(BENGALURU, MUMBAI, SpeedProfile::default(), Some(&driving));
        assert_eq!(cmp.driving_source, DrivingSource::Estimate);
    }

    #[test]
    fn test_savings_can_be_negative() {
        let driving = DrivingEstimate {
            duration_minutes: Some(5),
            polyline: Vec::new(),
        };
        let cmp = compare_times(BENGALURU, MUMBAI, SpeedProfile::default(), Some(&driving));
        assert_eq!(cmp.minutes_saved, 5 - 203);
    }

    #[test]
    fn test_zero_distance() {
        let cmp = estimate_times(BENGALURU, BENGALURU, SpeedProfile::default());
        assert_eq!(cmp.flying_minutes, 0);
        assert_eq!(cmp.driving_minutes, 0);
        assert_eq!(cmp.minutes_saved, 0);
    }

    #[test]
    fn test_nonpositive_speed_yields_zero() {
        let speeds = SpeedProfile {
            flying_kmh: 0.0,
            driving_kmh: -1.0,
        };
        let cmp = estimate_times(BENGALURU, MUMBAI, speeds);
        assert_eq!(cmp.flying_minutes, 0);
        assert_eq!(cmp.driving_minutes, 0);
    }
}
