//! Database layer (SQLite).

pub mod sqlite;

pub use sqlite::SqliteDb;

/// Table names as constants.
pub mod tables {
    /// Append-only log of OAuth tokens
    pub const ACCESS_TOKENS: &str = "strava_access_token";
    pub const ACTIVITIES: &str = "activity";
    /// Per-run copy of freshly fetched activities (dropped after each run)
    pub const STAGING: &str = "activity_staging";
}

/// Activity columns shared by the staging and permanent tables, in order.
///
/// Reconciliation compares rows over exactly these columns, so the
/// `created_at`/`updated_at` bookkeeping never counts as a change.
pub const ACTIVITY_COLUMNS: &str = "activity_id, athlete_id, gear_id, name, start_date, \
     start_date_local, timezone, utc_offset, start_lat, start_lng, end_lat, end_lng, \
     distance, moving_time, elapsed_time, total_elevation_gain";
