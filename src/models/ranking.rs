// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Public leaderboard entry model.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One user's public leaderboard projection, stored in Firestore at
/// `public-ranking/{uid}`.
///
/// `initial_weight_kg` is fixed from the first record the user ever
/// saved and is never recomputed from later edits of week-1 data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    /// Owner's user ID (also the document ID)
    pub uid: String,
    /// Display name
    pub display_name: String,
    /// Profile picture URL
    pub photo_url: Option<String>,
    /// Weight from the most recently saved record
    pub current_weight_kg: f64,
    /// Weight from the first record ever saved
    pub initial_weight_kg: f64,
    /// Derived total lost, floored at 0, 1 decimal
    pub total_lost_kg: f64,
    /// Last write timestamp (RFC3339)
    pub last_updated: String,
}

/// Sort leaderboard entries descending by total lost.
///
/// The sort is stable, so ties keep their incoming (document-key) order
/// and the result is a deterministic total order within a snapshot.
pub fn sort_leaderboard(entries: &mut [RankingEntry]) {
    entries.sort_by(|a, b| {
        b.total_lost_kg
            .partial_cmp(&a.total_lost_kg)
            .unwrap_or(Ordering::Equal)
    });
}
