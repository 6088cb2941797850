// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run configuration loaded from environment variables.
//!
//! Everything the sync needs is resolved once at startup and handed to the
//! orchestrator explicitly; nothing below reads the environment again.

use std::env;
use std::fmt;
use std::str::FromStr;

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/odometer.db";
const DEFAULT_API_URL: &str = "https://www.strava.com/api/v3";
const DEFAULT_OAUTH_TOKEN_URL: &str = "https://www.strava.com/oauth/token";

/// How far back a sync run fetches activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Fetch the athlete's whole history (`after=0`).
    Full,
    /// Fetch only activities starting after the newest stored one.
    #[default]
    Incremental,
}

impl FromStr for SyncMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FULL" => Ok(SyncMode::Full),
            "INCREMENTAL" => Ok(SyncMode::Incremental),
            other => Err(ConfigError::Invalid {
                name: "ODOMETER_SYNC_MODE",
                reason: format!("expected FULL or INCREMENTAL, got {:?}", other),
            }),
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Full => f.write_str("FULL"),
            SyncMode::Incremental => f.write_str("INCREMENTAL"),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Strava credentials ---
    /// Strava OAuth client ID
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Athlete whose history is synchronized
    pub athlete_id: i64,

    // --- Endpoints ---
    /// Base URL of the Strava REST API
    pub strava_api_url: String,
    /// Strava OAuth token endpoint
    pub strava_oauth_token_url: String,

    // --- Local store ---
    /// SQLite connection URL
    pub database_url: String,
    /// Full backfill or incremental fetch
    pub sync_mode: SyncMode,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            athlete_id: 12345,
            strava_api_url: DEFAULT_API_URL.to_string(),
            strava_oauth_token_url: DEFAULT_OAUTH_TOKEN_URL.to_string(),
            database_url: "sqlite::memory:".to_string(),
            sync_mode: SyncMode::Incremental,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let strava_client_id = required("STRAVA_CLIENTID")?;
        let strava_client_secret = required("STRAVA_CLIENTSECRET")?;
        let athlete_id = required("STRAVA_ATHLETEID")?
            .parse::<i64>()
            .map_err(|e| ConfigError::Invalid {
                name: "STRAVA_ATHLETEID",
                reason: format!("{}", e),
            })?;

        let sync_mode = match lookup("ODOMETER_SYNC_MODE") {
            Some(v) => v.parse()?,
            None => SyncMode::default(),
        };

        Ok(Self {
            strava_client_id,
            strava_client_secret,
            athlete_id,
            strava_api_url: lookup("STRAVA_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            strava_oauth_token_url: lookup("STRAVA_OAUTH_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_OAUTH_TOKEN_URL.to_string()),
            database_url: lookup("ODOMETER_DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            sync_mode,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
