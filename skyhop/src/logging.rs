//! Tracing subscriber setup.
//!
//! Logs go to stderr and, when a directory is configured, to a daily rolling
//! file written on a background thread. `RUST_LOG` overrides the default
//! filter.

use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "skyhop=info";

/// Prefix of rolling log file names.
pub const LOG_FILE_PREFIX: &str = "skyhop.log";

/// Errors installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(String),

    #[error("failed to install log subscriber: {0}")]
    Init(String),

    #[error("failed to create log directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Logging options.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Directory for rolling log files; `None` logs to stderr only.
    pub directory: Option<PathBuf>,
    pub default_filter: String,
    /// Use `debug` instead of the default filter level.
    pub verbose: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            directory: None,
            default_filter: DEFAULT_FILTER.to_string(),
            verbose: false,
        }
    }
}

impl LogOptions {
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn filter_directive(&self) -> String {
        if self.verbose {
            "skyhop=debug".to_string()
        } else {
            self.default_filter.clone()
        }
    }
}

/// Keeps the file writer alive; dropping it flushes pending log lines.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
pub fn init(options: LogOptions) -> Result<LogGuard, LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(options.filter_directive())
            .map_err(|e| LoggingError::Filter(e.to_string()))?,
    };

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, file_guard) = match &options.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(LogGuard { _file: file_guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_overrides_default_filter() {
        let options = LogOptions::default().with_verbose(true);
        assert_eq!(options.filter_directive(), "skyhop=debug");
        assert_eq!(LogOptions::default().filter_directive(), DEFAULT_FILTER);
    }

    #[test]
    fn test_with_directory() {
        let options = LogOptions::default().with_directory("/tmp/skyhop-logs");
        assert_eq!(options.directory, Some(PathBuf::from("/tmp/skyhop-logs")));
    }
}
