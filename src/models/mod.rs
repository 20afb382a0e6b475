// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod identity;
pub mod profile;
pub mod ranking;
pub mod record;

pub use identity::Identity;
pub use profile::UserProfile;
pub use ranking::RankingEntry;
pub use record::TrackingRecord;
