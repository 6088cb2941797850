// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite connection wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Access tokens (append-only OAuth token log)
//! - Staging (per-run copy of fetched activities)
//! - Activities (permanent table, reconciled against staging)

use crate::db::{tables, ACTIVITY_COLUMNS};
use crate::error::Result;
use crate::models::{AccessTokenRecord, Activity, StoredActivity};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, SqliteConnection};
use std::str::FromStr;
use std::time::Duration;

const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS strava_access_token (
    athlete_id INTEGER NOT NULL,
    access_token TEXT NOT NULL,
    expires_at INTEGER NOT NULL,
    refresh_token TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_strava_access_token_athlete_expiry
    ON strava_access_token (athlete_id, expires_at);

CREATE TABLE IF NOT EXISTS activity (
    activity_id INTEGER PRIMARY KEY,
    athlete_id INTEGER NOT NULL,
    gear_id TEXT,
    name TEXT NOT NULL,
    start_date TEXT NOT NULL,
    start_date_local TEXT NOT NULL,
    timezone TEXT NOT NULL,
    utc_offset REAL NOT NULL,
    start_lat REAL,
    start_lng REAL,
    end_lat REAL,
    end_lng REAL,
    distance REAL NOT NULL,
    moving_time INTEGER NOT NULL,
    elapsed_time INTEGER NOT NULL,
    total_elevation_gain REAL NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

const STAGING_DDL: &str = r#"
CREATE TABLE activity_staging (
    activity_id INTEGER PRIMARY KEY,
    athlete_id INTEGER NOT NULL,
    gear_id TEXT,
    name TEXT NOT NULL,
    start_date TEXT NOT NULL,
    start_date_local TEXT NOT NULL,
    timezone TEXT NOT NULL,
    utc_offset REAL NOT NULL,
    start_lat REAL,
    start_lng REAL,
    end_lat REAL,
    end_lng REAL,
    distance REAL NOT NULL,
    moving_time INTEGER NOT NULL,
    elapsed_time INTEGER NOT NULL,
    total_elevation_gain REAL NOT NULL
)
"#;

/// Exclusive SQLite connection for one sync run.
///
/// Dropping the value releases the connection, so early returns never leak it;
/// [`SqliteDb::close`] is the orderly shutdown on the success path.
pub struct SqliteDb {
    conn: SqliteConnection,
}

impl SqliteDb {
    /// Open (creating if missing) the database and make sure the permanent
    /// tables exist.
    ///
    /// `sqlite::memory:` yields a private in-memory database.
    pub async fn open(database_url: &str) -> Result<Self> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let conn = SqliteConnection::connect_with(&connect_opts).await?;
        let mut db = Self { conn };
        db.apply_schema().await?;

        tracing::info!(database_url, "Connected to SQLite");
        Ok(db)
    }

    async fn apply_schema(&mut self) -> Result<()> {
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&mut self.conn).await?;
        }
        Ok(())
    }

    /// Close the connection, flushing anything SQLite still holds.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }

    // ─── Token Operations ────────────────────────────────────────

    /// Get the token row with the latest expiry for an athlete.
    pub async fn latest_token(&mut self, athlete_id: i64) -> Result<Option<AccessTokenRecord>> {
        let sql = format!(
            "SELECT athlete_id, access_token, expires_at, refresh_token FROM {} \
             WHERE athlete_id = ? ORDER BY expires_at DESC LIMIT 1",
            tables::ACCESS_TOKENS
        );
        let token = sqlx::query_as::<_, AccessTokenRecord>(&sql)
            .bind(athlete_id)
            .fetch_optional(&mut self.conn)
            .await?;
        Ok(token)
    }

    /// Append a token row.
    pub async fn insert_token(&mut self, token: &AccessTokenRecord) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (athlete_id, access_token, expires_at, refresh_token) \
             VALUES (?, ?, ?, ?)",
            tables::ACCESS_TOKENS
        );
        sqlx::query(&sql)
            .bind(token.athlete_id)
            .bind(&token.access_token)
            .bind(token.expires_at)
            .bind(&token.refresh_token)
            .execute(&mut self.conn)
            .await?;
        Ok(())
    }

    /// Number of token rows on record for an athlete.
    pub async fn token_count(&mut self, athlete_id: i64) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE athlete_id = ?",
            tables::ACCESS_TOKENS
        );
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(athlete_id)
            .fetch_one(&mut self.conn)
            .await?;
        Ok(count)
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Latest `start_date` over all stored activities, `None` when empty.
    pub async fn latest_start_date(&mut self) -> Result<Option<String>> {
        let sql = format!("SELECT MAX(start_date) FROM {}", tables::ACTIVITIES);
        let latest = sqlx::query_scalar::<_, Option<String>>(&sql)
            .fetch_one(&mut self.conn)
            .await?;
        Ok(latest)
    }

    /// Get a stored activity by Strava ID.
    pub async fn get_activity(&mut self, activity_id: i64) -> Result<Option<StoredActivity>> {
        let sql = format!(
            "SELECT {}, created_at, updated_at FROM {} WHERE activity_id = ?",
            ACTIVITY_COLUMNS,
            tables::ACTIVITIES
        );
        let activity = sqlx::query_as::<_, StoredActivity>(&sql)
            .bind(activity_id)
            .fetch_optional(&mut self.conn)
            .await?;
        Ok(activity)
    }

    /// Number of activities in the permanent table.
    pub async fn activity_count(&mut self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", tables::ACTIVITIES);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&mut self.conn)
            .await?;
        Ok(count)
    }

    // ─── Staging Operations ──────────────────────────────────────

    /// Drop and recreate the staging table.
    pub async fn recreate_staging(&mut self) -> Result<()> {
        self.drop_staging().await?;
        sqlx::query(STAGING_DDL).execute(&mut self.conn).await?;
        Ok(())
    }

    /// Drop the staging table if present.
    pub async fn drop_staging(&mut self) -> Result<()> {
        let sql = format!("DROP TABLE IF EXISTS {}", tables::STAGING);
        sqlx::query(&sql).execute(&mut self.conn).await?;
        Ok(())
    }

    /// Whether the staging table currently exists.
    pub async fn staging_exists(&mut self) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(tables::STAGING)
        .fetch_one(&mut self.conn)
        .await?;
        Ok(count > 0)
    }

    /// Write a batch of rows into staging in one transaction.
    ///
    /// A row whose `activity_id` is already staged replaces the earlier one.
    /// Returns the number of rows written, one per input row.
    pub async fn stage_activities(&mut self, activities: &[Activity]) -> Result<u64> {
        if activities.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "INSERT OR REPLACE INTO {} ({}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            tables::STAGING,
            ACTIVITY_COLUMNS
        );

        let mut tx = self.conn.begin().await?;
        let mut staged = 0;
        for a in activities {
            let res = sqlx::query(&sql)
                .bind(a.activity_id)
                .bind(a.athlete_id)
                .bind(&a.gear_id)
                .bind(&a.name)
                .bind(&a.start_date)
                .bind(&a.start_date_local)
                .bind(&a.timezone)
                .bind(a.utc_offset)
                .bind(a.start_lat)
                .bind(a.start_lng)
                .bind(a.end_lat)
                .bind(a.end_lng)
                .bind(a.distance)
                .bind(a.moving_time)
                .bind(a.elapsed_time)
                .bind(a.total_elevation_gain)
                .execute(&mut *tx)
                .await?;
            staged += res.rows_affected();
        }
        tx.commit().await?;

        Ok(staged)
    }

    /// Number of rows currently staged.
    pub async fn staged_count(&mut self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", tables::STAGING);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&mut self.conn)
            .await?;
        Ok(count)
    }

    // ─── Reconciliation ──────────────────────────────────────────

    /// Copy staged rows whose `activity_id` is not yet stored into the
    /// permanent table, stamping `created_at = updated_at = now`.
    ///
    /// Runs in a single transaction; returns the number of rows inserted.
    pub async fn insert_new_activities(&mut self, now: DateTime<Utc>) -> Result<u64> {
        let sql = format!(
            "INSERT INTO {activity} ({cols}, created_at, updated_at) \
             SELECT {cols}, ?, ? FROM {staging} \
             WHERE activity_id NOT IN (SELECT activity_id FROM {activity})",
            activity = tables::ACTIVITIES,
            staging = tables::STAGING,
            cols = ACTIVITY_COLUMNS,
        );

        let mut tx = self.conn.begin().await?;
        let res = sqlx::query(&sql)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(res.rows_affected())
    }

    /// Replace stored rows whose staged version differs in any activity column.
    ///
    /// Differences are found by set difference over [`ACTIVITY_COLUMNS`]
    /// (NULLs compare equal), restricted to ids already stored. Each match is
    /// deleted and re-inserted from staging with its original `created_at`
    /// and `updated_at = now`. Runs in a single transaction; returns the
    /// number of rows replaced.
    pub async fn replace_changed_activities(&mut self, now: DateTime<Utc>) -> Result<u64> {
        let changed_sql = format!(
            "SELECT activity_id FROM ( \
                 SELECT {cols} FROM {staging} \
                 EXCEPT \
                 SELECT {cols} FROM {activity} \
             ) WHERE activity_id IN (SELECT activity_id FROM {activity}) \
             ORDER BY activity_id",
            activity = tables::ACTIVITIES,
            staging = tables::STAGING,
            cols = ACTIVITY_COLUMNS,
        );
        let created_sql = format!(
            "SELECT created_at FROM {} WHERE activity_id = ?",
            tables::ACTIVITIES
        );
        let delete_sql = format!("DELETE FROM {} WHERE activity_id = ?", tables::ACTIVITIES);
        let reinsert_sql = format!(
            "INSERT INTO {activity} ({cols}, created_at, updated_at) \
             SELECT {cols}, ?, ? FROM {staging} WHERE activity_id = ?",
            activity = tables::ACTIVITIES,
            staging = tables::STAGING,
            cols = ACTIVITY_COLUMNS,
        );

        let mut tx = self.conn.begin().await?;

        let changed: Vec<i64> = sqlx::query_scalar(&changed_sql)
            .fetch_all(&mut *tx)
            .await?;

        let mut replaced = 0;
        for activity_id in changed {
            let created_at: DateTime<Utc> = sqlx::query_scalar(&created_sql)
                .bind(activity_id)
                .fetch_one(&mut *tx)
                .await?;

            sqlx::query(&delete_sql)
                .bind(activity_id)
                .execute(&mut *tx)
                .await?;

            let res = sqlx::query(&reinsert_sql)
                .bind(created_at)
                .bind(now)
                .bind(activity_id)
                .execute(&mut *tx)
                .await?;
            replaced += res.rows_affected();

            tracing::debug!(activity_id, "Replaced changed activity");
        }

        tx.commit().await?;
        Ok(replaced)
    }
}
