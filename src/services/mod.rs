// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod reconcile;
pub mod strava;
pub mod sync;
pub mod token;

pub use activity::{ActivityFetcher, FetchSummary};
pub use reconcile::ReconcileSummary;
pub use strava::StravaClient;
pub use sync::{run_sync, SyncReport, SyncService};
pub use token::{TokenRefresher, ValidToken};
