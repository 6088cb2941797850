// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use bike_odometer::config::ConfigError;
use bike_odometer::error::AppError;

#[test]
fn test_error_kinds_are_stable() {
    let cases = [
        (
            AppError::from(ConfigError::Missing("STRAVA_CLIENTID")),
            "configuration_missing",
        ),
        (AppError::TokenNotFound(1), "token_not_found"),
        (AppError::AuthRefresh("HTTP 400".to_string()), "auth_refresh_failure"),
        (AppError::Fetch("HTTP 500".to_string()), "fetch_failure"),
        (AppError::Database("locked".to_string()), "store_failure"),
        (
            AppError::Internal(anyhow::anyhow!("bad date")),
            "internal_error",
        ),
    ];

    for (err, kind) in cases {
        assert_eq!(err.kind(), kind, "{}", err);
    }
}

#[test]
fn test_is_rate_limited_matches() {
    let err = AppError::Fetch(AppError::STRAVA_RATE_LIMIT.to_string());
    assert!(err.is_rate_limited());

    let err = AppError::AuthRefresh(AppError::STRAVA_RATE_LIMIT.to_string());
    assert!(err.is_rate_limited());
}

#[test]
fn test_is_rate_limited_no_match() {
    let err = AppError::Fetch("HTTP 500 Internal Server Error: {}".to_string());
    assert!(!err.is_rate_limited());

    let err = AppError::Database(AppError::STRAVA_RATE_LIMIT.to_string());
    assert!(!err.is_rate_limited());

    let err = AppError::TokenNotFound(42);
    assert!(!err.is_rate_limited());
}

#[test]
fn test_messages_name_the_cause() {
    let err = AppError::from(ConfigError::Missing("STRAVA_ATHLETEID"));
    assert_eq!(
        err.to_string(),
        "Configuration error: Missing required environment variable: STRAVA_ATHLETEID"
    );

    let err = AppError::TokenNotFound(12345);
    assert_eq!(err.to_string(), "No access token on record for athlete 12345");
}
