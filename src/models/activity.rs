// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity model for storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Flat activity row, as staged from Strava and compared during reconciliation.
///
/// This is the `activity` table minus its bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Activity {
    /// Strava activity ID (primary key)
    pub activity_id: i64,
    /// Strava athlete ID (owner)
    pub athlete_id: i64,
    /// Bike used, if recorded
    pub gear_id: Option<String>,
    /// Activity name/title
    pub name: String,
    /// Start date/time (ISO 8601, UTC)
    pub start_date: String,
    /// Start date/time in the athlete's local zone (ISO 8601)
    pub start_date_local: String,
    /// Timezone description, e.g. "(GMT-08:00) America/Los_Angeles"
    pub timezone: String,
    /// Offset from UTC in seconds
    pub utc_offset: f64,
    pub start_lat: Option<f64>,
    pub start_lng: Option<f64>,
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,
    /// Distance in meters
    pub distance: f64,
    /// Moving time in seconds
    pub moving_time: i64,
    /// Elapsed time in seconds
    pub elapsed_time: i64,
    /// Elevation gain in meters
    pub total_elevation_gain: f64,
}

/// Activity row in the permanent table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredActivity {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub activity: Activity,
    /// When the activity was first inserted
    pub created_at: DateTime<Utc>,
    /// When the activity was last replaced
    pub updated_at: DateTime<Utc>,
}
