// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory document store for offline tests and local development.
//!
//! Implements the same contract as the Firestore backend, including
//! merge-write semantics (documents are stored as JSON objects so that
//! fields outside [`UserProfile`] survive a merge) and live views that
//! re-deliver the full set on every change. Write failures can be
//! injected to exercise the pipeline's partial-failure paths.

use crate::db::store::{DocumentStore, Subscription};
use crate::error::{AppError, Result};
use crate::models::{RankingEntry, TrackingRecord, UserProfile};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Default)]
struct State {
    /// `users/{uid}` documents as raw JSON objects (merge semantics)
    profiles: BTreeMap<String, Value>,
    /// `users/{uid}/tracking/{doc_id}` documents
    tracking: BTreeMap<String, BTreeMap<String, TrackingRecord>>,
    /// `public-ranking/{uid}` documents
    ranking: BTreeMap<String, RankingEntry>,

    tracking_subs: Vec<TrackingSub>,
    ranking_subs: Vec<RankingSub>,
    next_sub_id: u64,

    /// Number of upcoming tracking writes that should fail
    fail_tracking_writes: u32,
    /// Number of upcoming ranking writes that should fail
    fail_ranking_writes: u32,
    /// Number of upcoming profile writes that should fail
    fail_profile_writes: u32,
}

struct TrackingSub {
    id: u64,
    uid: String,
    tx: mpsc::UnboundedSender<Vec<TrackingRecord>>,
}

struct RankingSub {
    id: u64,
    tx: mpsc::UnboundedSender<Vec<RankingEntry>>,
}

/// In-memory [`DocumentStore`] implementation.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile document from raw JSON (e.g. an admin-provisioned
    /// whitelist entry with fields the model does not know about).
    pub fn seed_profile_json(&self, uid: &str, doc: Value) {
        let mut state = self.state.lock().unwrap();
        state.profiles.insert(uid.to_string(), doc);
    }

    /// Raw profile document as stored, if present.
    pub fn profile_json(&self, uid: &str) -> Option<Value> {
        self.state.lock().unwrap().profiles.get(uid).cloned()
    }

    /// Current tracking records for a user, in document-key order.
    pub fn tracking_records(&self, uid: &str) -> Vec<TrackingRecord> {
        let state = self.state.lock().unwrap();
        state
            .tracking
            .get(uid)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Current ranking entry for a user, if present.
    pub fn ranking_entry(&self, uid: &str) -> Option<RankingEntry> {
        self.state.lock().unwrap().ranking.get(uid).cloned()
    }

    /// Make the next `n` tracking-record writes fail.
    pub fn fail_tracking_writes(&self, n: u32) {
        self.state.lock().unwrap().fail_tracking_writes = n;
    }

    /// Make the next `n` ranking-entry writes fail.
    pub fn fail_ranking_writes(&self, n: u32) {
        self.state.lock().unwrap().fail_ranking_writes = n;
    }

    /// Make the next `n` profile merge-writes fail.
    pub fn fail_profile_writes(&self, n: u32) {
        self.state.lock().unwrap().fail_profile_writes = n;
    }

    fn notify_tracking(state: &State, uid: &str) {
        let snapshot: Vec<TrackingRecord> = state
            .tracking
            .get(uid)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default();
        for sub in state.tracking_subs.iter().filter(|s| s.uid == uid) {
            let _ = sub.tx.send(snapshot.clone());
        }
    }

    fn notify_ranking(state: &State) {
        let snapshot: Vec<RankingEntry> = state.ranking.values().cloned().collect();
        for sub in &state.ranking_subs {
            let _ = sub.tx.send(snapshot.clone());
        }
    }

    fn take_injected_failure(counter: &mut u32, what: &str) -> Result<()> {
        if *counter > 0 {
            *counter -= 1;
            return Err(AppError::Database(format!("injected {} write failure", what)));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>> {
        let state = self.state.lock().unwrap();
        match state.profiles.get(uid) {
            None => Ok(None),
            Some(doc) => serde_json::from_value(doc.clone())
                .map(Some)
                .map_err(|e| AppError::Database(e.to_string())),
        }
    }

    async fn merge_profile(&self, uid: &str, profile: &UserProfile) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::take_injected_failure(&mut state.fail_profile_writes, "profile")?;

        let update = serde_json::to_value(profile).map_err(|e| AppError::Database(e.to_string()))?;
        let entry = state
            .profiles
            .entry(uid.to_string())
            .or_insert_with(|| Value::Object(Default::default()));
        if let (Value::Object(existing), Value::Object(fields)) = (entry, update) {
            for (key, value) in fields {
                existing.insert(key, value);
            }
        }
        Ok(())
    }

    async fn set_tracking_record(&self, uid: &str, record: &TrackingRecord) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::take_injected_failure(&mut state.fail_tracking_writes, "tracking")?;

        state
            .tracking
            .entry(uid.to_string())
            .or_default()
            .insert(TrackingRecord::doc_id(record.week), record.clone());
        Self::notify_tracking(&state, uid);
        Ok(())
    }

    async fn set_ranking_entry(&self, entry: &RankingEntry) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::take_injected_failure(&mut state.fail_ranking_writes, "ranking")?;

        state.ranking.insert(entry.uid.clone(), entry.clone());
        Self::notify_ranking(&state);
        Ok(())
    }

    async fn subscribe_tracking(
        &self,
        uid: &str,
        tx: mpsc::UnboundedSender<Vec<TrackingRecord>>,
    ) -> Result<Box<dyn Subscription>> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_sub_id;
        state.next_sub_id += 1;

        let snapshot: Vec<TrackingRecord> = state
            .tracking
            .get(uid)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default();
        let _ = tx.send(snapshot);

        state.tracking_subs.push(TrackingSub {
            id,
            uid: uid.to_string(),
            tx,
        });
        Ok(Box::new(MemorySubscription {
            id,
            state: self.state.clone(),
        }))
    }

    async fn subscribe_ranking(
        &self,
        tx: mpsc::UnboundedSender<Vec<RankingEntry>>,
    ) -> Result<Box<dyn Subscription>> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_sub_id;
        state.next_sub_id += 1;

        let _ = tx.send(state.ranking.values().cloned().collect());

        state.ranking_subs.push(RankingSub { id, tx });
        Ok(Box::new(MemorySubscription {
            id,
            state: self.state.clone(),
        }))
    }
}

struct MemorySubscription {
    id: u64,
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl Subscription for MemorySubscription {
    async fn unsubscribe(self: Box<Self>) {
        let mut state = self.state.lock().unwrap();
        state.tracking_subs.retain(|s| s.id != self.id);
        state.ranking_subs.retain(|s| s.id != self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(week: u32, weight_kg: f64) -> TrackingRecord {
        TrackingRecord {
            week,
            weight_kg,
            date: "2026-01-05".to_string(),
            bmi: 33.06,
            dose_mg: 2.5,
            updated_at: "2026-01-05T10:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_overwrite_keeps_collection_size() {
        let store = MemoryStore::new();
        store.set_tracking_record("u1", &record(1, 90.0)).await.unwrap();
        store.set_tracking_record("u1", &record(1, 89.0)).await.unwrap();

        let records = store.tracking_records("u1");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].weight_kg, 89.0);
    }

    #[tokio::test]
    async fn test_merge_profile_preserves_unknown_fields() {
        let store = MemoryStore::new();
        store.seed_profile_json(
            "u1",
            serde_json::json!({ "role": "admin", "email": "old@example.com" }),
        );

        let profile = UserProfile {
            email: Some("new@example.com".to_string()),
            last_login: "2026-01-05T10:00:00Z".to_string(),
        };
        store.merge_profile("u1", &profile).await.unwrap();

        let doc = store.profile_json("u1").unwrap();
        assert_eq!(doc["role"], "admin");
        assert_eq!(doc["email"], "new@example.com");
        assert_eq!(doc["lastLogin"], "2026-01-05T10:00:00Z");
    }

    #[tokio::test]
    async fn test_injected_failure_consumed_once() {
        let store = MemoryStore::new();
        store.fail_ranking_writes(1);

        let entry = RankingEntry {
            uid: "u1".to_string(),
            display_name: "U".to_string(),
            photo_url: None,
            current_weight_kg: 90.0,
            initial_weight_kg: 90.0,
            total_lost_kg: 0.0,
            last_updated: "2026-01-05T10:00:00Z".to_string(),
        };
        assert!(store.set_ranking_entry(&entry).await.is_err());
        assert!(store.set_ranking_entry(&entry).await.is_ok());
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let store = MemoryStore::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sub = store.subscribe_tracking("u1", tx).await.unwrap();
        assert!(rx.recv().await.unwrap().is_empty()); // initial snapshot

        sub.unsubscribe().await;
        store.set_tracking_record("u1", &record(1, 90.0)).await.unwrap();
        assert!(rx.try_recv().is_err());
    }
}
