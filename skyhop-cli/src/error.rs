//! CLI error type.

use std::fmt;

use skyhop::config::ConfigError;
use skyhop::geo::GeoError;
use skyhop::logging::LoggingError;
use skyhop::route::StoreError;
use skyhop::session::SessionError;
use skyhop::timing::DirectionsError;

/// Errors surfaced to the user. Every variant exits non-zero.
#[derive(Debug)]
pub enum CliError {
    /// Bad arguments or configuration values.
    Config(String),
    ConfigFile(ConfigError),
    Geo(GeoError),
    Store(StoreError),
    Session(SessionError),
    Directions(DirectionsError),
    Logging(LoggingError),
    Runtime(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "{}", msg),
            CliError::ConfigFile(e) => write!(f, "Configuration error: {}", e),
            CliError::Geo(e) => write!(f, "Invalid location: {}", e),
            CliError::Store(e) => write!(f, "Routes error: {}", e),
            CliError::Session(e) => write!(f, "Session error: {}", e),
            CliError::Directions(e) => write!(f, "Directions error: {}", e),
            CliError::Logging(e) => write!(f, "Logging error: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(_) => None,
            CliError::ConfigFile(e) => Some(e),
            CliError::Geo(e) => Some(e),
            CliError::Store(e) => Some(e),
            CliError::Session(e) => Some(e),
            CliError::Directions(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Runtime(e) => Some(e),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<GeoError> for CliError {
    fn from(e: GeoError) -> Self {
        CliError::Geo(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<SessionError> for CliError {
    fn from(e: SessionError) -> Self {
        CliError::Session(e)
    }
}

impl From<DirectionsError> for CliError {
    fn from(e: DirectionsError) -> Self {
        CliError::Directions(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}
