// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access token lifecycle.
//!
//! The stored token with the latest expiry is used as-is unless it expires
//! within [`TOKEN_REFRESH_MARGIN_SECS`]; then it is exchanged with Strava and
//! the new token is appended to the token log.

use crate::db::SqliteDb;
use crate::error::{AppError, Result};
use crate::models::AccessTokenRecord;
use crate::services::strava::StravaClient;
use crate::time_utils::format_unix_rfc3339;
use chrono::{DateTime, Utc};

/// Remaining lifetime at or below which a token is refreshed (1 hour).
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60 * 60;

/// Access token ready for API calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidToken {
    pub access_token: String,
    pub expires_at: i64,
    /// Whether this run obtained the token from Strava
    pub refreshed: bool,
}

/// Resolves a usable access token, refreshing through Strava when needed.
#[derive(Clone)]
pub struct TokenRefresher {
    client: StravaClient,
}

impl TokenRefresher {
    pub fn new(client: StravaClient) -> Self {
        Self { client }
    }

    /// Get a valid access token for the athlete as of now.
    pub async fn get_valid_access_token(
        &self,
        db: &mut SqliteDb,
        athlete_id: i64,
    ) -> Result<ValidToken> {
        self.get_valid_access_token_at(db, athlete_id, Utc::now())
            .await
    }

    /// Get a valid access token for the athlete as of `now`.
    ///
    /// Fails with [`AppError::TokenNotFound`] when the athlete has never been
    /// authorized. A refresh failure is fatal; there is no retry.
    pub async fn get_valid_access_token_at(
        &self,
        db: &mut SqliteDb,
        athlete_id: i64,
        now: DateTime<Utc>,
    ) -> Result<ValidToken> {
        let latest = db
            .latest_token(athlete_id)
            .await?
            .ok_or(AppError::TokenNotFound(athlete_id))?;

        let ttl_secs = latest.expires_at - now.timestamp();
        tracing::info!(
            athlete_id,
            expires_at = %format_unix_rfc3339(latest.expires_at),
            ttl_secs,
            expired = ttl_secs < 0,
            "Latest access token"
        );

        if ttl_secs > TOKEN_REFRESH_MARGIN_SECS {
            return Ok(ValidToken {
                access_token: latest.access_token,
                expires_at: latest.expires_at,
                refreshed: false,
            });
        }

        tracing::info!(athlete_id, "Access token expired or expiring soon, refreshing");

        let new_tokens = self.client.refresh_token(&latest.refresh_token).await?;

        let record = AccessTokenRecord {
            athlete_id,
            access_token: new_tokens.access_token,
            expires_at: new_tokens.expires_at,
            refresh_token: new_tokens.refresh_token,
        };
        db.insert_token(&record).await?;

        tracing::info!(
            athlete_id,
            expires_at = %format_unix_rfc3339(record.expires_at),
            "Token refreshed and stored"
        );

        Ok(ValidToken {
            access_token: record.access_token,
            expires_at: record.expires_at,
            refreshed: true,
        })
    }
}
