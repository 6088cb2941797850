// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity fetching and staging.
//!
//! Handles the fetch half of a sync run:
//! 1. Page through the athlete's activities until Strava returns an empty page
//! 2. Keep only rides
//! 3. Map each ride to a flat [`Activity`] row
//! 4. Write each page's rows into the staging table

use crate::db::SqliteDb;
use crate::error::{AppError, Result};
use crate::models::Activity;
use crate::services::strava::{StravaActivitySummary, StravaClient};
use serde_json::Value;

/// Strava activity `type` kept by the fetcher.
pub const RIDE_ACTIVITY_TYPE: &str = "Ride";

/// Totals from one fetch-and-stage pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Pages that contained at least one activity
    pub pages: u32,
    /// Activity objects returned by Strava, of any type
    pub rows_scanned: u64,
    /// Rides written to staging
    pub rows_staged: u64,
}

/// Pages Strava activities into the staging table.
#[derive(Clone)]
pub struct ActivityFetcher {
    client: StravaClient,
}

impl ActivityFetcher {
    pub fn new(client: StravaClient) -> Self {
        Self { client }
    }

    /// Fetch every page after `after` and stage the rides.
    ///
    /// Pagination stops at the first empty page. Any failed request or
    /// malformed ride aborts the whole pass; rows staged by earlier pages stay
    /// in the staging table.
    pub async fn fetch_and_stage(
        &self,
        db: &mut SqliteDb,
        access_token: &str,
        after: Option<i64>,
    ) -> Result<FetchSummary> {
        let mut summary = FetchSummary::default();
        let mut page = 1u32;

        loop {
            let result = self
                .client
                .list_activities(access_token, after, page)
                .await?;

            if let Some(rl) = result.rate_limit {
                tracing::info!(
                    page,
                    usage_15min = rl.usage_15min,
                    limit_15min = rl.limit_15min,
                    usage_daily = rl.usage_daily,
                    limit_daily = rl.limit_daily,
                    "Strava rate limit usage"
                );
            }

            if result.activities.is_empty() {
                break;
            }

            let scanned = result.activities.len() as u64;
            let rides = rides_from_page(result.activities)?;
            let staged = db.stage_activities(&rides).await?;

            summary.pages += 1;
            summary.rows_scanned += scanned;
            summary.rows_staged += staged;

            tracing::info!(
                page,
                scanned,
                staged,
                "Staged activity page"
            );

            page += 1;
        }

        tracing::info!(
            pages = summary.pages,
            rows_scanned = summary.rows_scanned,
            rows_staged = summary.rows_staged,
            "Finished fetching activities"
        );
        Ok(summary)
    }
}

/// Whether a raw activity object is a ride.
pub fn is_ride(raw: &Value) -> bool {
    raw.get("type").and_then(Value::as_str) == Some(RIDE_ACTIVITY_TYPE)
}

/// Filter a page down to rides and map them to rows.
pub fn rides_from_page(page: Vec<Value>) -> Result<Vec<Activity>> {
    page.into_iter()
        .filter(is_ride)
        .map(|raw| -> Result<Activity> {
            let summary: StravaActivitySummary = serde_json::from_value(raw)
                .map_err(|e| AppError::Fetch(format!("Malformed ride: {}", e)))?;
            Ok(map_activity(summary))
        })
        .collect()
}

/// Map a Strava summary to the flat row shape.
///
/// A missing start or end location becomes a `None` latitude/longitude pair.
pub fn map_activity(summary: StravaActivitySummary) -> Activity {
    let (start_lat, start_lng) = split_latlng(summary.start_latlng.as_deref());
    let (end_lat, end_lng) = split_latlng(summary.end_latlng.as_deref());

    Activity {
        activity_id: summary.id,
        athlete_id: summary.athlete.id,
        gear_id: summary.gear_id,
        name: summary.name,
        start_date: summary.start_date,
        start_date_local: summary.start_date_local,
        timezone: summary.timezone,
        utc_offset: summary.utc_offset,
        start_lat,
        start_lng,
        end_lat,
        end_lng,
        distance: summary.distance,
        moving_time: summary.moving_time,
        elapsed_time: summary.elapsed_time,
        total_elevation_gain: summary.total_elevation_gain,
    }
}

fn split_latlng(latlng: Option<&[f64]>) -> (Option<f64>, Option<f64>) {
    match latlng {
        Some([lat, lng]) => (Some(*lat), Some(*lng)),
        _ => (None, None),
    }
}
