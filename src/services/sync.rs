// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync run orchestration.
//!
//! A run is strictly linear:
//! 1. Open the store
//! 2. Resolve (and if needed refresh) the access token
//! 3. Pick the fetch lower bound from the sync mode
//! 4. Recreate staging, then fetch and stage rides
//! 5. Reconcile staging into `activity` (insert, then update)
//! 6. Drop staging and close the store
//!
//! Any error aborts the remaining steps. Work committed before the failure,
//! including a half-filled staging table, is left as is.

use crate::config::{Config, SyncMode};
use crate::db::SqliteDb;
use crate::error::{AppError, Result};
use crate::services::activity::ActivityFetcher;
use crate::services::reconcile::reconcile_at;
use crate::services::strava::StravaClient;
use crate::services::token::TokenRefresher;
use crate::time_utils::parse_unix_timestamp;
use chrono::{DateTime, Utc};

/// Outcome of a successful sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub mode: SyncMode,
    /// Lower bound passed to Strava (`None` = whole history)
    pub after: Option<i64>,
    pub token_refreshed: bool,
    pub rows_scanned: u64,
    pub rows_staged: u64,
    pub inserted: u64,
    pub updated: u64,
}

/// Runs the token → fetch → reconcile pipeline for one athlete.
#[derive(Clone)]
pub struct SyncService {
    athlete_id: i64,
    mode: SyncMode,
    tokens: TokenRefresher,
    fetcher: ActivityFetcher,
}

impl SyncService {
    pub fn new(config: &Config) -> Self {
        let client = StravaClient::from_config(config);
        Self {
            athlete_id: config.athlete_id,
            mode: config.sync_mode,
            tokens: TokenRefresher::new(client.clone()),
            fetcher: ActivityFetcher::new(client),
        }
    }

    /// Run the sync against an open store.
    pub async fn run(&self, db: &mut SqliteDb) -> Result<SyncReport> {
        self.run_at(db, Utc::now()).await
    }

    /// Run the sync against an open store, treating `now` as the current time
    /// for token expiry and row timestamps.
    pub async fn run_at(&self, db: &mut SqliteDb, now: DateTime<Utc>) -> Result<SyncReport> {
        let token = self
            .tokens
            .get_valid_access_token_at(db, self.athlete_id, now)
            .await?;

        let after = fetch_lower_bound(db, self.mode).await?;
        tracing::info!(
            athlete_id = self.athlete_id,
            mode = %self.mode,
            after = ?after,
            "Fetching activities"
        );

        db.recreate_staging().await?;
        let fetched = self
            .fetcher
            .fetch_and_stage(db, &token.access_token, after)
            .await?;

        let reconciled = reconcile_at(db, now).await?;
        db.drop_staging().await?;

        Ok(SyncReport {
            mode: self.mode,
            after,
            token_refreshed: token.refreshed,
            rows_scanned: fetched.rows_scanned,
            rows_staged: fetched.rows_staged,
            inserted: reconciled.inserted,
            updated: reconciled.updated,
        })
    }
}

/// Lower bound for the activity listing.
///
/// `Full` always starts at the epoch; `Incremental` starts at the newest
/// stored `start_date`, or fetches everything when nothing is stored yet.
pub async fn fetch_lower_bound(db: &mut SqliteDb, mode: SyncMode) -> Result<Option<i64>> {
    match mode {
        SyncMode::Full => Ok(Some(0)),
        SyncMode::Incremental => {
            let Some(latest) = db.latest_start_date().await? else {
                return Ok(None);
            };
            let after = parse_unix_timestamp(&latest).map_err(|e| {
                AppError::Internal(anyhow::anyhow!(
                    "Stored start_date {:?} is not RFC3339: {}",
                    latest,
                    e
                ))
            })?;
            Ok(Some(after))
        }
    }
}

/// Open the configured store, run one sync, and close the store.
///
/// The connection is released on every path; on error it is dropped with
/// whatever the last committed transaction left behind.
pub async fn run_sync(config: &Config) -> Result<SyncReport> {
    let mut db = SqliteDb::open(&config.database_url).await?;
    let report = SyncService::new(config).run(&mut db).await?;
    db.close().await?;
    Ok(report)
}
