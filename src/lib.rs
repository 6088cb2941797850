// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Bike odometer: keep a local copy of a cyclist's Strava rides
//!
//! This crate refreshes the athlete's Strava access token when it is close to
//! expiry, pages through their activities, and reconciles the rides into a
//! local SQLite `activity` table (new rows inserted, changed rows replaced).

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;
