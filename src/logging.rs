// ABOUTME: Logging configuration and structured logging setup
// ABOUTME: Configures log levels and output format for the tracing subscriber
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured logging configuration.
//!
//! Binaries and integration harnesses call [`LoggingConfig::init`] once at
//! startup; library code only ever emits through `tracing` macros and never
//! installs a subscriber itself.

use std::env;
use std::io;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());

        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };

        Self { level, format }
    }

    /// Install the global tracing subscriber.
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed.
    pub fn init(&self) -> Result<()> {
        let filter = EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"));

        let fmt_layer = match self.format {
            LogFormat::Json => fmt::layer()
                .with_target(true)
                .with_writer(io::stdout)
                .json()
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .with_target(true)
                .with_writer(io::stdout)
                .boxed(),
            LogFormat::Compact => fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(io::stdout)
                .boxed(),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()?;

        info!(level = %self.level, format = ?self.format, "logging initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        env::remove_var("RUST_LOG");
        env::remove_var("LOG_FORMAT");

        let config = LoggingConfig::from_env();

        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    #[serial]
    fn test_format_selection() {
        env::set_var("LOG_FORMAT", "json");
        assert_eq!(LoggingConfig::from_env().format, LogFormat::Json);

        env::set_var("LOG_FORMAT", "compact");
        assert_eq!(LoggingConfig::from_env().format, LogFormat::Compact);

        env::remove_var("LOG_FORMAT");
    }
}
