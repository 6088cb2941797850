// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.
//!
//! Every variant is fatal for the run: errors propagate to `main`, which logs
//! them and exits nonzero.

use crate::config::ConfigError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No access token on record for athlete {0}")]
    TokenNotFound(i64),

    #[error("Token refresh failed: {0}")]
    AuthRefresh(String),

    #[error("Activity fetch failed: {0}")]
    Fetch(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message used when Strava answers 429 Too Many Requests.
    pub const STRAVA_RATE_LIMIT: &'static str = "Strava rate limit exceeded";

    /// Stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "configuration_missing",
            AppError::TokenNotFound(_) => "token_not_found",
            AppError::AuthRefresh(_) => "auth_refresh_failure",
            AppError::Fetch(_) => "fetch_failure",
            AppError::Database(_) => "store_failure",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Whether this error came from hitting the Strava rate limit.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            AppError::AuthRefresh(msg) | AppError::Fetch(msg) => {
                msg.contains(Self::STRAVA_RATE_LIMIT)
            }
            _ => false,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, AppError>;
