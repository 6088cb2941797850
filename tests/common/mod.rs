// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bike_odometer::config::Config;
use bike_odometer::db::SqliteDb;
use bike_odometer::models::{AccessTokenRecord, Activity};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const ATHLETE_ID: i64 = 12345;

/// Expiry handed out by the mock token endpoint (2100-01-01).
pub const REFRESHED_EXPIRES_AT: i64 = 4_102_444_800;

/// Fixed "current time" for deterministic runs.
#[allow(dead_code)]
pub fn test_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
}

/// Create a fresh in-memory store.
#[allow(dead_code)]
pub async fn test_db() -> SqliteDb {
    SqliteDb::open("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite")
}

/// Store a token row for [`ATHLETE_ID`].
#[allow(dead_code)]
pub async fn seed_token(db: &mut SqliteDb, access_token: &str, expires_at: i64) {
    db.insert_token(&AccessTokenRecord {
        athlete_id: ATHLETE_ID,
        access_token: access_token.to_string(),
        expires_at,
        refresh_token: format!("{}-refresh", access_token),
    })
    .await
    .expect("Failed to seed token");
}

/// Temp file path for tests that need a file-backed store.
#[allow(dead_code)]
pub fn unique_sqlite_path(prefix: &str) -> std::path::PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "bike-odometer-{prefix}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    temp_path
}

/// Config pointing every Strava endpoint at a mock server.
#[allow(dead_code)]
pub fn test_config(base_url: &str) -> Config {
    Config {
        athlete_id: ATHLETE_ID,
        strava_api_url: format!("{}/api/v3", base_url),
        strava_oauth_token_url: format!("{}/oauth/token", base_url),
        ..Config::default()
    }
}

/// Strava list-endpoint JSON for a ride.
#[allow(dead_code)]
pub fn ride_json(id: i64, start_date: &str, distance: f64) -> Value {
    json!({
        "resource_state": 2,
        "id": id,
        "athlete": { "id": ATHLETE_ID, "resource_state": 1 },
        "type": "Ride",
        "sport_type": "Ride",
        "gear_id": "b1234567",
        "name": format!("Ride {}", id),
        "start_date": start_date,
        "start_date_local": start_date,
        "timezone": "(GMT-08:00) America/Los_Angeles",
        "utc_offset": -28800.0,
        "start_latlng": [37.4, -122.2],
        "end_latlng": [37.41, -122.21],
        "distance": distance,
        "moving_time": 3600,
        "elapsed_time": 3900,
        "total_elevation_gain": 450.0
    })
}

/// Strava list-endpoint JSON for a non-ride.
#[allow(dead_code)]
pub fn other_json(id: i64, activity_type: &str) -> Value {
    json!({
        "id": id,
        "athlete": { "id": ATHLETE_ID },
        "type": activity_type,
        "name": format!("{} {}", activity_type, id),
        "start_date": "2024-01-01T10:00:00Z"
    })
}

/// Flat activity row for staging directly.
#[allow(dead_code)]
pub fn sample_activity(activity_id: i64) -> Activity {
    Activity {
        activity_id,
        athlete_id: ATHLETE_ID,
        gear_id: Some("b1234567".to_string()),
        name: format!("Ride {}", activity_id),
        start_date: "2024-03-09T16:20:00Z".to_string(),
        start_date_local: "2024-03-09T08:20:00Z".to_string(),
        timezone: "(GMT-08:00) America/Los_Angeles".to_string(),
        utc_offset: -28800.0,
        start_lat: Some(37.4),
        start_lng: Some(-122.2),
        end_lat: None,
        end_lng: None,
        distance: 25000.0,
        moving_time: 3600,
        elapsed_time: 3900,
        total_elevation_gain: 450.0,
    }
}

// ─── Mock Strava ─────────────────────────────────────────────────────────────

struct MockState {
    /// Page N (1-based) is `pages[N - 1]`; later pages are empty
    pages: Vec<Vec<Value>>,
    activities_status: StatusCode,
    token_status: StatusCode,
    token_body: Value,
    token_requests: Vec<HashMap<String, String>>,
    activity_requests: Vec<HashMap<String, String>>,
}

/// In-process stand-in for the Strava OAuth and activities endpoints.
#[derive(Clone)]
pub struct MockStrava {
    state: Arc<Mutex<MockState>>,
}

#[allow(dead_code)]
impl MockStrava {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                pages: Vec::new(),
                activities_status: StatusCode::OK,
                token_status: StatusCode::OK,
                token_body: json!({
                    "token_type": "Bearer",
                    "access_token": "refreshed-access",
                    "refresh_token": "refreshed-refresh",
                    "expires_at": REFRESHED_EXPIRES_AT,
                    "expires_in": 21600
                }),
                token_requests: Vec::new(),
                activity_requests: Vec::new(),
            })),
        }
    }

    pub fn with_pages(self, pages: Vec<Vec<Value>>) -> Self {
        self.state.lock().unwrap().pages = pages;
        self
    }

    pub fn with_activities_status(self, status: StatusCode) -> Self {
        self.state.lock().unwrap().activities_status = status;
        self
    }

    pub fn with_token_response(self, status: StatusCode, body: Value) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.token_status = status;
            state.token_body = body;
        }
        self
    }

    /// Replace the pages served from now on.
    pub fn set_pages(&self, pages: Vec<Vec<Value>>) {
        self.state.lock().unwrap().pages = pages;
    }

    pub fn token_requests(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().unwrap().token_requests.clone()
    }

    pub fn activity_requests(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().unwrap().activity_requests.clone()
    }

    /// Serve on an ephemeral local port and return the base URL.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/oauth/token", post(token_handler))
            .route("/api/v3/athlete/activities", get(activities_handler))
            .with_state(self.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server run");
        });

        format!("http://{}", addr)
    }
}

async fn token_handler(
    State(mock): State<MockStrava>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let mut state = mock.state.lock().unwrap();
    state.token_requests.push(form);
    (state.token_status, Json(state.token_body.clone())).into_response()
}

async fn activities_handler(
    State(mock): State<MockStrava>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut state = mock.state.lock().unwrap();
    let page: usize = query
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    state.activity_requests.push(query);

    if !state.activities_status.is_success() {
        return (
            state.activities_status,
            Json(json!({ "message": "Rate Limit Exceeded" })),
        )
            .into_response();
    }

    let body = state
        .pages
        .get(page.saturating_sub(1))
        .cloned()
        .unwrap_or_default();

    (
        StatusCode::OK,
        [
            ("x-ratelimit-usage", "5,50"),
            ("x-ratelimit-limit", "200,2000"),
        ],
        Json(Value::Array(body)),
    )
        .into_response()
}
