// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Document store contract.
//!
//! The external document database is reached only through this trait, so
//! the session gate, subscription manager, and mutation pipeline never
//! depend on a concrete backend. [`crate::db::FirestoreDb`] is the
//! production implementation; [`crate::db::MemoryStore`] backs offline
//! tests.

use crate::error::Result;
use crate::models::{RankingEntry, TrackingRecord, UserProfile};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Handle for a live view; dropping it without calling
/// [`Subscription::unsubscribe`] leaks the backing listener.
#[async_trait]
pub trait Subscription: Send {
    /// Stop the live view and release its resources.
    async fn unsubscribe(self: Box<Self>);
}

/// Narrow contract over the external document store.
///
/// Live views re-deliver the *full* current result set on every change;
/// consumers replace their previous snapshot rather than patching it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the profile document at `users/{uid}`, if present.
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>>;

    /// Merge-write the profile at `users/{uid}`. Fields not present in
    /// [`UserProfile`] must survive the write.
    async fn merge_profile(&self, uid: &str, profile: &UserProfile) -> Result<()>;

    /// Create or overwrite the tracking record keyed by `(uid, week)`.
    async fn set_tracking_record(&self, uid: &str, record: &TrackingRecord) -> Result<()>;

    /// Create or overwrite the caller's leaderboard entry (keyed by uid).
    async fn set_ranking_entry(&self, entry: &RankingEntry) -> Result<()>;

    /// Open a live view over `users/{uid}/tracking`. The current set is
    /// delivered immediately, then again after every change.
    async fn subscribe_tracking(
        &self,
        uid: &str,
        tx: mpsc::UnboundedSender<Vec<TrackingRecord>>,
    ) -> Result<Box<dyn Subscription>>;

    /// Open a live view over the public ranking collection.
    async fn subscribe_ranking(
        &self,
        tx: mpsc::UnboundedSender<Vec<RankingEntry>>,
    ) -> Result<Box<dyn Subscription>>;
}
