//! Configuration file model and persistence.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;
use tracing::{debug, warn};

use super::keys::ConfigKey;
use crate::animation::{AnimationConfig, DEFAULT_DURATION_MS, DEFAULT_FRAME_INTERVAL, DEFAULT_LOOKAHEAD};
use crate::overlay::DuplicatePolicy;
use crate::route::{RouteOrder, RouteQuery};
use crate::session::{SessionConfig, DEFAULT_REFRESH_INTERVAL};
use crate::timing::{
    DirectionsError, HttpDirectionsService, SpeedProfile, DEFAULT_DIRECTIONS_ENDPOINT,
    DEFAULT_DRIVING_SPEED_KMH, DEFAULT_FLYING_SPEED_KMH,
};

const APP_DIR: &str = "skyhop";
const CONFIG_FILE: &str = "config.ini";

/// Errors loading, saving or editing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key: {0}")]
    UnknownKey(String),
}

/// `[animation]` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSettings {
    pub duration_ms: u64,
    pub frame_interval_ms: u64,
    pub lookahead: f64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS as u64,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL.as_millis() as u64,
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }
}

/// `[refresh]` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSettings {
    pub interval_secs: u64,
    pub order: RouteOrder,
    pub limit: Option<usize>,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_REFRESH_INTERVAL.as_secs(),
            order: RouteOrder::Recency,
            limit: None,
        }
    }
}

/// `[timing]` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingSettings {
    pub flying_speed_kmh: f64,
    pub driving_speed_kmh: f64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            flying_speed_kmh: DEFAULT_FLYING_SPEED_KMH,
            driving_speed_kmh: DEFAULT_DRIVING_SPEED_KMH,
        }
    }
}

/// `[overlay]` settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlaySettings {
    pub duplicate_policy: DuplicatePolicy,
}

/// `[directions]` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsSettings {
    pub endpoint: String,
    /// No token means driving times are always estimated.
    pub access_token: Option<String>,
}

impl Default for DirectionsSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_DIRECTIONS_ENDPOINT.to_string(),
            access_token: None,
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkyhopConfig {
    pub animation: AnimationSettings,
    pub refresh: RefreshSettings,
    pub timing: TimingSettings,
    pub overlay: OverlaySettings,
    pub directions: DirectionsSettings,
}

/// Directory holding the configuration file.
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Default configuration file path.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE)
}

impl SkyhopConfig {
    /// Load from the default path.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, falling back to defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(io) => ConfigError::Io(io),
            ini::Error::Parse(parse) => ConfigError::Parse {
                path: path.to_path_buf(),
                message: parse.to_string(),
            },
        })?;
        Self::from_ini(&ini)
    }

    /// Build from parsed INI, applying every known key that is present.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for (section, properties) in ini.iter() {
            let Some(section) = section else { continue };
            for (key, value) in properties.iter() {
                let name = format!("{}.{}", section, key);
                match name.parse::<ConfigKey>() {
                    Ok(config_key) => config_key.set(&mut config, value)?,
                    Err(_) => warn!(key = %name, "Ignoring unknown configuration key"),
                }
            }
        }

        Ok(config)
    }

    /// Serialise every key to INI.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }

    /// Save to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Session settings derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        let animation = AnimationConfig::default()
            .with_duration_ms(self.animation.duration_ms as f64)
            .with_lookahead(self.animation.lookahead)
            .with_frame_interval(Duration::from_millis(self.animation.frame_interval_ms));

        let mut query = match self.refresh.order {
            RouteOrder::Recency => RouteQuery::recent(),
            RouteOrder::Popularity => RouteQuery::popular(),
        };
        if let Some(limit) = self.refresh.limit {
            query = query.with_limit(limit);
        }

        SessionConfig::default()
            .with_animation(animation)
            .with_refresh_interval(Duration::from_secs(self.refresh.interval_secs))
            .with_refresh_query(query)
            .with_speeds(self.speed_profile())
            .with_duplicate_policy(self.overlay.duplicate_policy)
    }

    pub fn speed_profile(&self) -> SpeedProfile {
        SpeedProfile {
            flying_kmh: self.timing.flying_speed_kmh,
            driving_kmh: self.timing.driving_speed_kmh,
        }
    }

    /// HTTP directions client, if an access token is configured.
    pub fn directions_service(&self) -> Result<Option<HttpDirectionsService>, DirectionsError> {
        match &self.directions.access_token {
            Some(token) => HttpDirectionsService::new(&self.directions.endpoint, token).map(Some),
            None => Ok(None),
        }
    }
}
