//! INI configuration.
//!
//! Settings live in `config.ini` under the platform config directory
//! (`~/.config/skyhop/config.ini` on Linux). A missing file means defaults;
//! a present file only needs the keys it wants to override.
//!
//! ```ini
//! [animation]
//! duration_ms = 10000
//! frame_interval_ms = 16
//! lookahead = 0.01
//!
//! [refresh]
//! interval_secs = 10
//! order = recency
//! limit =
//!
//! [timing]
//! flying_speed_kmh = 250
//! driving_speed_kmh = 60
//!
//! [overlay]
//! duplicate_policy = replace
//!
//! [directions]
//! endpoint = https://api.mapbox.com/directions/v5/mapbox/driving
//! access_token =
//! ```

mod file;
mod keys;

pub use file::{
    config_directory, config_file_path, AnimationSettings, ConfigError, DirectionsSettings,
    OverlaySettings, RefreshSettings, SkyhopConfig, TimingSettings,
};
pub use keys::ConfigKey;
