//! Structured logging for Proteus.
//!
//! Every pipeline stage logs through `tracing` inside the invocation span.
//! This module installs a `tracing-subscriber` formatter for applications
//! that embed the engine and have no subscriber of their own.
//!
//! # Example
//!
//! ```rust,ignore
//! use proteus::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Errors raised while installing the logging subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The level directive does not parse.
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// A global subscriber is already installed.
    #[error("Failed to initialize logging: {0}")]
    Init(String),
}

/// Result type for logging setup.
pub type LoggingResult<T> = Result<T, LoggingError>;

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Level directive (e.g. "info", "proteus_mocker=debug,warn").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include target (module path).
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            ..Self::default()
        }
    }

    /// Builds the level filter.
    pub fn filter(&self) -> LoggingResult<EnvFilter> {
        EnvFilter::try_new(&self.level).map_err(|e| LoggingError::InvalidLevel(e.to_string()))
    }
}

/// Installs the global logging subscriber.
///
/// Does nothing when logging is disabled.
pub fn init_logging(config: &LogConfig) -> LoggingResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = config.filter()?;
    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_span_events(span_events)
        .with_file(config.file_line_info)
        .with_line_number(config.file_line_info)
        .with_target(config.include_target);

    let layer = if config.json_format {
        layer.json().with_filter(filter).boxed()
    } else {
        layer.pretty().with_filter(filter).boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))
}
