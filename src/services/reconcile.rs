// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Staging → permanent table reconciliation.

use crate::db::SqliteDb;
use crate::error::Result;
use chrono::{DateTime, Utc};

/// Rows written by one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub inserted: u64,
    pub updated: u64,
}

/// Apply staged rows to the `activity` table: insert phase, then update phase.
///
/// Each phase is its own transaction. If the update phase fails, the inserts
/// from the first phase remain.
pub async fn reconcile_at(db: &mut SqliteDb, now: DateTime<Utc>) -> Result<ReconcileSummary> {
    let inserted = db.insert_new_activities(now).await?;
    tracing::info!(inserted, "Inserted new activities");

    let updated = db.replace_changed_activities(now).await?;
    tracing::info!(updated, "Updated changed activities");

    Ok(ReconcileSummary { inserted, updated })
}

/// [`reconcile_at`] with the current time.
pub async fn reconcile(db: &mut SqliteDb) -> Result<ReconcileSummary> {
    reconcile_at(db, Utc::now()).await
}
