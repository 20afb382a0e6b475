// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - User profiles (the authorization documents)
//! - Tracking records (per-user weekly measurements)
//! - Ranking entries (the public leaderboard)
//!
//! Live views are backed by Firestore listen targets; each view keeps the
//! full document set in memory and re-delivers a complete snapshot on
//! every change.

use crate::db::collections;
use crate::db::store::{DocumentStore, Subscription};
use crate::error::{AppError, Result};
use crate::models::{RankingEntry, TrackingRecord, UserProfile};
use async_trait::async_trait;
use firestore::{
    paths_camel_case, FirestoreListenEvent, FirestoreListener, FirestoreListenerTarget,
    FirestoreTempFilesListenStateStorage,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Listen target for the personal tracking view.
const TRACKING_TARGET: FirestoreListenerTarget = FirestoreListenerTarget::new(1_u32);
/// Listen target for the global ranking view.
const RANKING_TARGET: FirestoreListenerTarget = FirestoreListenerTarget::new(2_u32);

type Listener = FirestoreListener<firestore::FirestoreDb, FirestoreTempFilesListenStateStorage>;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }
}

#[async_trait]
impl DocumentStore for FirestoreDb {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn merge_profile(&self, uid: &str, profile: &UserProfile) -> Result<()> {
        // Field-masked update: only the listed fields are touched, so an
        // admin-provisioned profile keeps whatever else it contains.
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(paths_camel_case!(UserProfile::{email, last_login}))
            .in_col(collections::USERS)
            .document_id(uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(uid, "Profile merged");
        Ok(())
    }

    async fn set_tracking_record(&self, uid: &str, record: &TrackingRecord) -> Result<()> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::USERS, uid.to_string())
            .map_err(|e| AppError::Database(e.to_string()))?;

        let _: () = client
            .fluent()
            .update()
            .in_col(collections::TRACKING)
            .document_id(TrackingRecord::doc_id(record.week))
            .parent(&parent_path)
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(uid, week = record.week, "Tracking record stored");
        Ok(())
    }

    async fn set_ranking_entry(&self, entry: &RankingEntry) -> Result<()> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::RANKING)
            .document_id(&entry.uid)
            .object(entry)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(uid = %entry.uid, total_lost = entry.total_lost_kg, "Ranking entry stored");
        Ok(())
    }

    async fn subscribe_tracking(
        &self,
        uid: &str,
        tx: mpsc::UnboundedSender<Vec<TrackingRecord>>,
    ) -> Result<Box<dyn Subscription>> {
        let client = self.get_client()?.clone();
        let parent_path = client
            .parent_path(collections::USERS, uid.to_string())
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Seed with the current set so the first snapshot does not wait
        // for the listen stream; listen events then keep it current.
        let initial: Vec<TrackingRecord> = client
            .fluent()
            .select()
            .from(collections::TRACKING)
            .parent(&parent_path)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let seed: BTreeMap<String, TrackingRecord> = initial
            .into_iter()
            .map(|r| (TrackingRecord::doc_id(r.week), r))
            .collect();

        let mut listener = client
            .create_listener(FirestoreTempFilesListenStateStorage::new())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .select()
            .from(collections::TRACKING)
            .parent(&parent_path)
            .listen()
            .add_target(TRACKING_TARGET, &mut listener)
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(uid, "Tracking view subscribed");
        start_snapshot_listener(listener, seed, tx).await
    }

    async fn subscribe_ranking(
        &self,
        tx: mpsc::UnboundedSender<Vec<RankingEntry>>,
    ) -> Result<Box<dyn Subscription>> {
        let client = self.get_client()?.clone();

        let initial: Vec<RankingEntry> = client
            .fluent()
            .select()
            .from(collections::RANKING)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let seed: BTreeMap<String, RankingEntry> =
            initial.into_iter().map(|e| (e.uid.clone(), e)).collect();

        let mut listener = client
            .create_listener(FirestoreTempFilesListenStateStorage::new())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .select()
            .from(collections::RANKING)
            .listen()
            .add_target(RANKING_TARGET, &mut listener)
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!("Ranking view subscribed");
        start_snapshot_listener(listener, seed, tx).await
    }
}

/// Start a listener that folds document changes into a keyed set and
/// re-delivers the full snapshot after every change.
async fn start_snapshot_listener<T>(
    mut listener: Listener,
    seed: BTreeMap<String, T>,
    tx: mpsc::UnboundedSender<Vec<T>>,
) -> Result<Box<dyn Subscription>>
where
    T: serde::de::DeserializeOwned + Clone + Send + Sync + 'static,
{
    let _ = tx.send(seed.values().cloned().collect());
    let docs = Arc::new(Mutex::new(seed));

    listener
        .start(move |event| {
            let docs = docs.clone();
            let tx = tx.clone();
            async move {
                match event {
                    FirestoreListenEvent::DocumentChange(change) => {
                        if let Some(doc) = change.document {
                            match firestore::FirestoreDb::deserialize_doc_to::<T>(&doc) {
                                Ok(obj) => {
                                    let mut guard = docs.lock().await;
                                    guard.insert(doc_key(&doc.name), obj);
                                    let _ = tx.send(guard.values().cloned().collect());
                                }
                                Err(e) => {
                                    tracing::warn!(
                                        doc = %doc.name,
                                        error = %e,
                                        "Skipping undeserializable document"
                                    );
                                }
                            }
                        }
                    }
                    FirestoreListenEvent::DocumentDelete(deleted) => {
                        let mut guard = docs.lock().await;
                        if guard.remove(&doc_key(&deleted.document)).is_some() {
                            let _ = tx.send(guard.values().cloned().collect());
                        }
                    }
                    FirestoreListenEvent::DocumentRemove(removed) => {
                        let mut guard = docs.lock().await;
                        if guard.remove(&doc_key(&removed.document)).is_some() {
                            let _ = tx.send(guard.values().cloned().collect());
                        }
                    }
                    _ => {}
                }
                Ok(())
            }
        })
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Box::new(FirestoreSubscription { listener }))
}

/// Document ID from a full Firestore resource name.
fn doc_key(resource_name: &str) -> String {
    resource_name
        .rsplit('/')
        .next()
        .unwrap_or(resource_name)
        .to_string()
}

struct FirestoreSubscription {
    listener: Listener,
}

#[async_trait]
impl Subscription for FirestoreSubscription {
    async fn unsubscribe(mut self: Box<Self>) {
        if let Err(e) = self.listener.shutdown().await {
            tracing::warn!(error = %e, "Listener shutdown failed");
        }
    }
}
