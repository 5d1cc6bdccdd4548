//! Addressable configuration keys for `config get/set/list`.

use std::str::FromStr;

use super::file::{ConfigError, SkyhopConfig};
use crate::route::RouteOrder;

/// A `section.key` configuration entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    AnimationDurationMs,
    AnimationFrameIntervalMs,
    AnimationLookahead,
    RefreshIntervalSecs,
    RefreshOrder,
    RefreshLimit,
    TimingFlyingSpeedKmh,
    TimingDrivingSpeedKmh,
    OverlayDuplicatePolicy,
    DirectionsEndpoint,
    DirectionsAccessToken,
}

const ALL_KEYS: [ConfigKey; 11] = [
    ConfigKey::AnimationDurationMs,
    ConfigKey::AnimationFrameIntervalMs,
    ConfigKey::AnimationLookahead,
    ConfigKey::RefreshIntervalSecs,
    ConfigKey::RefreshOrder,
    ConfigKey::RefreshLimit,
    ConfigKey::TimingFlyingSpeedKmh,
    ConfigKey::TimingDrivingSpeedKmh,
    ConfigKey::OverlayDuplicatePolicy,
    ConfigKey::DirectionsEndpoint,
    ConfigKey::DirectionsAccessToken,
];

impl ConfigKey {
    /// Every key, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::AnimationDurationMs
            | ConfigKey::AnimationFrameIntervalMs
            | ConfigKey::AnimationLookahead => "animation",
            ConfigKey::RefreshIntervalSecs | ConfigKey::RefreshOrder | ConfigKey::RefreshLimit => {
                "refresh"
            }
            ConfigKey::TimingFlyingSpeedKmh | ConfigKey::TimingDrivingSpeedKmh => "timing",
            ConfigKey::OverlayDuplicatePolicy => "overlay",
            ConfigKey::DirectionsEndpoint | ConfigKey::DirectionsAccessToken => "directions",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::AnimationDurationMs => "duration_ms",
            ConfigKey::AnimationFrameIntervalMs => "frame_interval_ms",
            ConfigKey::AnimationLookahead => "lookahead",
            ConfigKey::RefreshIntervalSecs => "interval_secs",
            ConfigKey::RefreshOrder => "order",
            ConfigKey::RefreshLimit => "limit",
            ConfigKey::TimingFlyingSpeedKmh => "flying_speed_kmh",
            ConfigKey::TimingDrivingSpeedKmh => "driving_speed_kmh",
            ConfigKey::OverlayDuplicatePolicy => "duplicate_policy",
            ConfigKey::DirectionsEndpoint => "endpoint",
            ConfigKey::DirectionsAccessToken => "access_token",
        }
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &SkyhopConfig) -> String {
        match self {
            ConfigKey::AnimationDurationMs => config.animation.duration_ms.to_string(),
            ConfigKey::AnimationFrameIntervalMs => config.animation.frame_interval_ms.to_string(),
            ConfigKey::AnimationLookahead => config.animation.lookahead.to_string(),
            ConfigKey::RefreshIntervalSecs => config.refresh.interval_secs.to_string(),
            ConfigKey::RefreshOrder => config.refresh.order.to_string(),
            ConfigKey::RefreshLimit => config
                .refresh
                .limit
                .map(|l| l.to_string())
                .unwrap_or_default(),
            ConfigKey::TimingFlyingSpeedKmh => config.timing.flying_speed_kmh.to_string(),
            ConfigKey::TimingDrivingSpeedKmh => config.timing.driving_speed_kmh.to_string(),
            ConfigKey::OverlayDuplicatePolicy => config.overlay.duplicate_policy.to_string(),
            ConfigKey::DirectionsEndpoint => config.directions.endpoint.clone(),
            ConfigKey::DirectionsAccessToken => {
                config.directions.access_token.clone().unwrap_or_default()
            }
        }
    }

    /// Parse and store `value`.
    pub fn set(&self, config: &mut SkyhopConfig, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::AnimationDurationMs => {
                config.animation.duration_ms = self.positive_int(value)?;
            }
            ConfigKey::AnimationFrameIntervalMs => {
                config.animation.frame_interval_ms = self.positive_int(value)?;
            }
            ConfigKey::AnimationLookahead => {
                let lookahead = self.float(value)?;
                if !(lookahead > 0.0 && lookahead <= 1.0) {
                    return Err(self.invalid(value, "must be in (0, 1]"));
                }
                config.animation.lookahead = lookahead;
            }
            ConfigKey::RefreshIntervalSecs => {
                config.refresh.interval_secs = self.positive_int(value)?;
            }
            ConfigKey::RefreshOrder => {
                config.refresh.order = value
                    .parse::<RouteOrder>()
                    .map_err(|reason| self.invalid(value, &reason))?;
            }
            ConfigKey::RefreshLimit => {
                config.refresh.limit = if value.is_empty() {
                    None
                } else {
                    Some(self.positive_int(value)? as usize)
                };
            }
            ConfigKey::TimingFlyingSpeedKmh => {
                config.timing.flying_speed_kmh = self.positive_float(value)?;
            }
            ConfigKey::TimingDrivingSpeedKmh => {
                config.timing.driving_speed_kmh = self.positive_float(value)?;
            }
            ConfigKey::OverlayDuplicatePolicy => {
                config.overlay.duplicate_policy =
                    value.parse().map_err(|reason: String| self.invalid(value, &reason))?;
            }
            ConfigKey::DirectionsEndpoint => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(self.invalid(value, "must be an http(s) URL"));
                }
                config.directions.endpoint = value.trim_end_matches('/').to_string();
            }
            ConfigKey::DirectionsAccessToken => {
                config.directions.access_token =
                    (!value.is_empty()).then(|| value.to_string());
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn positive_int(&self, value: &str) -> Result<u64, ConfigError> {
        match value.parse::<u64>() {
            Ok(n) if n > 0 => Ok(n),
            Ok(_) => Err(self.invalid(value, "must be greater than zero")),
            Err(_) => Err(self.invalid(value, "expected a whole number")),
        }
    }

    fn float(&self, value: &str) -> Result<f64, ConfigError> {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.invalid(value, "expected a number"))
    }

    fn positive_float(&self, value: &str) -> Result<f64, ConfigError> {
        let v = self.float(value)?;
        if v <= 0.0 {
            return Err(self.invalid(value, "must be greater than zero"));
        }
        Ok(v)
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::DuplicatePolicy;

    #[test]
    fn test_parse_key_names() {
        assert_eq!(
            "animation.duration_ms".parse::<ConfigKey>().unwrap(),
            ConfigKey::AnimationDurationMs
        );
        assert_eq!(
            "Refresh.Order".parse::<ConfigKey>().unwrap(),
            ConfigKey::RefreshOrder
        );
        assert!(matches!(
            "animation.speed".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_every_key_round_trips_its_default() {
        let defaults = SkyhopConfig::default();
        let mut config = SkyhopConfig::default();
        for key in ConfigKey::all() {
            let value = key.get(&defaults);
            key.set(&mut config, &value).unwrap();
        }
        assert_eq!(config, defaults);
    }

    #[test]
    fn test_set_rejects_zero_duration() {
        let mut config = SkyhopConfig::default();
        let err = ConfigKey::AnimationDurationMs
            .set(&mut config, "0")
            .unwrap_err();
        assert!(err.to_string().contains("animation.duration_ms"));
    }

    #[test]
    fn test_set_lookahead_bounds() {
        let mut config = SkyhopConfig::default();
        assert!(ConfigKey::AnimationLookahead.set(&mut config, "1.5").is_err());
        ConfigKey::AnimationLookahead.set(&mut config, "0.05").unwrap();
        assert_eq!(config.animation.lookahead, 0.05);
    }

    #[test]
    fn test_set_policy_and_token() {
        let mut config = SkyhopConfig::default();
        ConfigKey::OverlayDuplicatePolicy
            .set(&mut config, "replace")
            .unwrap();
        ConfigKey::DirectionsAccessToken
            .set(&mut config, "pk.abc")
            .unwrap();
        assert_eq!(config.overlay.duplicate_policy, DuplicatePolicy::Replace);
        assert_eq!(config.directions.access_token.as_deref(), Some("pk.abc"));

        ConfigKey::DirectionsAccessToken.set(&mut config, "").unwrap();
        assert!(config.directions.access_token.is_none());
    }

    #[test]
    fn test_set_endpoint_requires_url() {
        let mut config = SkyhopConfig::default();
        assert!(ConfigKey::DirectionsEndpoint
            .set(&mut config, "api.example.com")
            .is_err());
    }
}
