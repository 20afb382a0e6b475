// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! TirzeFlow: personal weight tracking with a shared leaderboard.
//!
//! This crate is the headless client core: it resolves a session from
//! the external identity provider, keeps two live views (personal
//! history, global ranking) derived from Firestore, computes dose/BMI/
//! total-lost metrics, and projects each submitted measurement into the
//! three stored documents. The UI shell consumes it through [`App`].

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod models;
pub mod services;
pub mod time_utils;

pub use app::App;
