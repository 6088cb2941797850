// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for token refresh and activity listing.
//!
//! Handles:
//! - Token refresh against the OAuth endpoint
//! - Paged activity listing
//! - Rate limit reporting (informational; no backoff)

use crate::config::Config;
use crate::error::{AppError, Result};
use reqwest::header::HeaderMap;
use serde::Deserialize;

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials and endpoints.
    pub fn new(
        client_id: String,
        client_secret: String,
        base_url: String,
        token_url: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token_url,
            client_id,
            client_secret,
        }
    }

    /// Create a client from the run configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.strava_client_id.clone(),
            config.strava_client_secret.clone(),
            config.strava_api_url.clone(),
            config.strava_oauth_token_url.clone(),
        )
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRefreshResponse> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::AuthRefresh(format!("Token refresh request failed: {}", e)))?;

        tracing::info!(
            url = %self.token_url,
            status = response.status().as_u16(),
            "Token refresh request returned"
        );

        check_response_json(response, AppError::AuthRefresh).await
    }

    /// List one page of the athlete's activities.
    ///
    /// `after` (unix seconds) restricts the listing to activities starting
    /// later; `None` omits the parameter entirely.
    pub async fn list_activities(
        &self,
        access_token: &str,
        after: Option<i64>,
        page: u32,
    ) -> Result<ActivityPage> {
        let url = format!("{}/athlete/activities", self.base_url);

        let mut query = vec![
            ("access_token", access_token.to_string()),
            ("page", page.to_string()),
        ];
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::Fetch(e.to_string()))?;

        let rate_limit = RateLimit::from_headers(response.headers());
        let activities = check_response_json(response, AppError::Fetch).await?;

        Ok(ActivityPage {
            activities,
            rate_limit,
        })
    }
}

/// Check response status and parse the JSON body, reporting failures through
/// `into_err` so each call site keeps its own error kind.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
    into_err: fn(String) -> AppError,
) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("Strava rate limit hit (429)");
            return Err(into_err(AppError::STRAVA_RATE_LIMIT.to_string()));
        }

        return Err(into_err(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| into_err(format!("JSON parse error: {}", e)))
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

/// One page of the activity listing.
///
/// Activities are kept as raw JSON so every object counts as scanned even
/// when it is not a ride and would not fit [`StravaActivitySummary`].
#[derive(Debug, Clone)]
pub struct ActivityPage {
    pub activities: Vec<serde_json::Value>,
    pub rate_limit: Option<RateLimit>,
}

/// Summary activity from the list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaActivitySummary {
    pub id: i64,
    pub athlete: StravaAthleteRef,
    pub gear_id: Option<String>,
    pub name: String,
    pub start_date: String,
    pub start_date_local: String,
    pub timezone: String,
    pub utc_offset: f64,
    /// `[lat, lng]`; Strava sends `null` or `[]` for activities without GPS
    #[serde(default)]
    pub start_latlng: Option<Vec<f64>>,
    #[serde(default)]
    pub end_latlng: Option<Vec<f64>>,
    pub distance: f64,
    pub moving_time: i64,
    pub elapsed_time: i64,
    pub total_elevation_gain: f64,
}

/// Athlete reference embedded in activity summaries.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaAthleteRef {
    pub id: i64,
}

/// Request usage and limits reported by Strava on each API response.
///
/// Both headers carry `"<15-minute>,<daily>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub usage_15min: u32,
    pub usage_daily: u32,
    pub limit_15min: u32,
    pub limit_daily: u32,
}

impl RateLimit {
    /// Parse `X-RateLimit-Usage` / `X-RateLimit-Limit`; `None` if either is
    /// missing or malformed.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let (usage_15min, usage_daily) = parse_pair(headers, "x-ratelimit-usage")?;
        let (limit_15min, limit_daily) = parse_pair(headers, "x-ratelimit-limit")?;
        Some(Self {
            usage_15min,
            usage_daily,
            limit_15min,
            limit_daily,
        })
    }
}

fn parse_pair(headers: &HeaderMap, name: &str) -> Option<(u32, u32)> {
    let value = headers.get(name)?.to_str().ok()?;
    let (short, daily) = value.split_once(',')?;
    Some((short.trim().parse().ok()?, daily.trim().parse().ok()?))
}
