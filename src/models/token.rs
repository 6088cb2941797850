// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava OAuth token model.

use serde::{Deserialize, Serialize};

/// One row of the `strava_access_token` log.
///
/// Rows are only ever appended; the row with the latest `expires_at` for an
/// athlete is the authoritative one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccessTokenRecord {
    /// Strava athlete ID
    pub athlete_id: i64,
    /// Bearer token for the Strava API
    pub access_token: String,
    /// When the access token expires (unix seconds)
    pub expires_at: i64,
    /// Token exchanged for a new access token on refresh
    pub refresh_token: String,
}
