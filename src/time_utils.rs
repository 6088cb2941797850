// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time conversion.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a unix timestamp as RFC3339, falling back to the raw number when
/// it is out of chrono's range.
pub fn format_unix_rfc3339(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(format_utc_rfc3339)
        .unwrap_or_else(|| timestamp.to_string())
}

/// Parse a Strava ISO 8601 date (e.g. `2024-03-09T16:20:00Z`) into a unix timestamp.
pub fn parse_unix_timestamp(date: &str) -> Result<i64, chrono::ParseError> {
    DateTime::parse_from_rfc3339(date).map(|dt| dt.timestamp())
}
