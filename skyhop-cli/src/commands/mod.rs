//! CLI command implementations.

pub mod config;
pub mod plan;
pub mod routes;
pub mod simulate;

use std::sync::Arc;

use skyhop::config::SkyhopConfig;
use skyhop::timing::DirectionsService;

use crate::error::CliError;

/// Multi-threaded tokio runtime for async commands.
pub fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)
}

/// Load configuration, treating an unreadable file as an error.
pub fn load_config() -> Result<SkyhopConfig, CliError> {
    Ok(SkyhopConfig::load()?)
}

/// Configured directions service, unless disabled.
pub fn directions(
    config: &SkyhopConfig,
    disabled: bool,
) -> Result<Option<Arc<dyn DirectionsService>>, CliError> {
    if disabled {
        return Ok(None);
    }
    let service = config.directions_service()?;
    Ok(service.map(|s| Arc::new(s) as Arc<dyn DirectionsService>))
}
