// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod token;

pub use activity::{Activity, StoredActivity};
pub use token::AccessTokenRecord;
