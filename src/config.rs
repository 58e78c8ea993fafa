// ABOUTME: Environment-driven application configuration
// ABOUTME: Database URL, JWT secret, token validities, and pool sizing with parse-or-default handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Application Configuration
//!
//! Configuration is read from the process environment once at startup.
//! Numeric overrides that fail to parse fall back to their defaults with a
//! warning; a missing `JWT_SECRET` is a hard error because there is no safe
//! default for signing material.

use std::env;
use std::str::FromStr;

use tracing::warn;

use crate::constants::tokens::{ACCESS_TOKEN_VALIDITY_SECS, REFRESH_TOKEN_VALIDITY_SECS};
use crate::errors::{AppError, AppResult};

/// Default connection string when `DATABASE_URL` is unset
const DEFAULT_DATABASE_URL: &str = "sqlite:fleet.db";

/// Default bound for the connection pool
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Application configuration assembled from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Store connection string (`sqlite:` path or `sqlite::memory:`)
    pub database_url: String,
    /// HMAC signing secret for token issuance; required
    pub jwt_secret: String,
    /// Access token validity in seconds
    pub access_token_validity_secs: i64,
    /// Refresh token validity in seconds
    pub refresh_token_validity_secs: i64,
    /// Upper bound on pooled store connections
    pub max_connections: u32,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when `JWT_SECRET` is unset or empty.
    pub fn from_env() -> AppResult<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| {
                AppError::internal("JWT_SECRET must be set; refusing to start without one")
            })?;

        Ok(Self {
            database_url: env_var_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            jwt_secret,
            access_token_validity_secs: env_parse_or(
                "ACCESS_TOKEN_VALIDITY_SECS",
                ACCESS_TOKEN_VALIDITY_SECS,
            ),
            refresh_token_validity_secs: env_parse_or(
                "REFRESH_TOKEN_VALIDITY_SECS",
                REFRESH_TOKEN_VALIDITY_SECS,
            ),
            max_connections: env_parse_or("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
        })
    }
}

/// Read an environment variable, falling back to `default` when unset
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse a numeric environment variable, falling back to `default` when
/// unset or unparseable
fn env_parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{key}={raw} is not a valid value, using default {default}");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "DATABASE_URL",
            "JWT_SECRET",
            "ACCESS_TOKEN_VALIDITY_SECS",
            "REFRESH_TOKEN_VALIDITY_SECS",
            "DATABASE_MAX_CONNECTIONS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_missing_secret_is_a_hard_error() {
        clear_env();

        assert!(AppConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_defaults_apply_when_only_secret_is_set() {
        clear_env();
        env::set_var("JWT_SECRET", "unit-test-secret");

        let config = AppConfig::from_env().unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.access_token_validity_secs, 120);
        assert_eq!(config.refresh_token_validity_secs, 345_600);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_unparseable_override_falls_back_to_default() {
        clear_env();
        env::set_var("JWT_SECRET", "unit-test-secret");
        env::set_var("ACCESS_TOKEN_VALIDITY_SECS", "not-a-number");
        env::set_var("DATABASE_MAX_CONNECTIONS", "12");

        let config = AppConfig::from_env().unwrap();

        assert_eq!(config.access_token_validity_secs, 120);
        assert_eq!(config.max_connections, 12);
        clear_env();
    }
}
