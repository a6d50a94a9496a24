//! Logging setup
//!
//! The library itself only emits `tracing` events. Applications that do not
//! install their own subscriber can call [`setup_logging`] once at startup.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{VoiceError, VoiceResult};

/// Configuration for the logging system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (`trace`, `debug`, `info`, `warn`, `error`)
    pub level: String,
    /// Whether to enable JSON formatting
    pub json: bool,
    /// Whether to include file and line information
    pub file_info: bool,
    /// Whether to log spans
    pub log_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            json: false,
            file_info: false,
            log_spans: false,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new(level: impl Into<String>) -> Self {
        LoggingConfig {
            level: level.into(),
            ..Default::default()
        }
    }

    /// Enable JSON formatting
    pub fn with_json(mut self) -> Self {
        self.json = true;
        self
    }

    /// Enable file and line information in logs
    pub fn with_file_info(mut self) -> Self {
        self.file_info = true;
        self
    }

    /// Enable span logging
    pub fn with_spans(mut self) -> Self {
        self.log_spans = true;
        self
    }

    pub fn validate(&self) -> VoiceResult<()> {
        parse_log_level(&self.level).map(|_| ())
    }
}

/// Parse a log level from a string
pub fn parse_log_level(level: &str) -> VoiceResult<Level> {
    Level::from_str(level).map_err(|_| VoiceError::config(format!("Invalid log level: {}", level)))
}

/// Install a global `tracing` subscriber for the given configuration
///
/// `RUST_LOG` directives are honored on top of the configured level. Fails
/// if a global subscriber is already installed.
pub fn setup_logging(config: &LoggingConfig) -> VoiceResult<()> {
    let level = parse_log_level(&config.level)?;
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let span_events = if config.log_spans {
        FmtSpan::ACTIVE
    } else {
        FmtSpan::NONE
    };

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_span_events(span_events)
        .with_file(config.file_info)
        .with_line_number(config.file_info);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| VoiceError::config(format!("failed to install logging: {}", e)))?;
    tracing::info!("Voice client logging initialized at level {}", level);
    Ok(())
}
