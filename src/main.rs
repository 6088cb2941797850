// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bike odometer sync
//!
//! Pulls the configured athlete's rides from Strava into the local SQLite
//! store. Exits nonzero on any failure.

use bike_odometer::{config::Config, error::AppError, services::run_sync};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment; nothing touches the network or
    // the store before this succeeds
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => return abort(e.into()),
    };
    tracing::info!(
        athlete_id = config.athlete_id,
        mode = %config.sync_mode,
        "Starting bike odometer sync"
    );

    match run_sync(&config).await {
        Ok(report) => {
            tracing::info!(
                mode = %report.mode,
                token_refreshed = report.token_refreshed,
                rows_scanned = report.rows_scanned,
                rows_staged = report.rows_staged,
                inserted = report.inserted,
                updated = report.updated,
                "Sync complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => abort(e),
    }
}

fn abort(err: AppError) -> ExitCode {
    tracing::error!(
        kind = err.kind(),
        rate_limited = err.is_rate_limited(),
        error = %err,
        "Sync aborted"
    );
    ExitCode::FAILURE
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bike_odometer=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
