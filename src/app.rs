// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session context: ties the gate, views, and pipeline to one lifecycle.
//!
//! There is a single active session per [`App`]. Only the gate (via
//! [`App::on_auth_state`]) transitions it, only the subscription manager
//! replaces snapshots, and the pipeline only writes remote documents.

use crate::config::Config;
use crate::db::{DocumentStore, FirestoreDb};
use crate::error::{AppError, Result};
use crate::models::{Identity, RankingEntry};
use crate::services::{
    AuthEvent, GoogleIdentityProvider, HistorySnapshot, IdentityProvider, RecordPipeline, Session,
    SessionGate, SubmissionForm, SubmissionPlan, SubscriptionManager,
};
use std::sync::Arc;
use tokio::sync::watch;

/// Application core for one client instance.
pub struct App {
    auth: Arc<dyn IdentityProvider>,
    gate: SessionGate,
    pipeline: RecordPipeline,
    store: Arc<dyn DocumentStore>,
    session: Option<Session>,
    views: Option<SubscriptionManager>,
}

impl App {
    /// Wire the core against explicit collaborators (tests inject their
    /// own store and provider here).
    pub fn new(store: Arc<dyn DocumentStore>, auth: Arc<dyn IdentityProvider>) -> Self {
        Self {
            gate: SessionGate::new(store.clone(), auth.clone()),
            pipeline: RecordPipeline::new(store.clone()),
            auth,
            store,
            session: None,
            views: None,
        }
    }

    /// Production wiring: Firestore plus the Google identity provider.
    pub async fn connect(config: &Config) -> Result<Self> {
        let db = FirestoreDb::new(&config.gcp_project_id).await?;
        let auth = GoogleIdentityProvider::new(config).map_err(AppError::Internal)?;
        Ok(Self::new(Arc::new(db), Arc::new(auth)))
    }

    /// Current session, if one is authorized.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authorized(&self) -> bool {
        self.session.is_some()
    }

    /// Sign in with an external credential and resolve the session.
    pub async fn sign_in(&mut self, credential: &str) -> Result<()> {
        let identity = self.auth.sign_in(credential).await?;
        self.on_auth_state(Some(identity)).await
    }

    /// Sign out of the external provider and clear local state.
    pub async fn sign_out(&mut self) -> Result<()> {
        self.auth.sign_out().await;
        self.on_auth_state(None).await
    }

    /// Apply one external auth-state change.
    ///
    /// Any open views are torn down before the gate runs, and new views
    /// open only after the gate fully resolves, so a stale view can
    /// never deliver into the next session's state. Runs once per
    /// auth-state change event.
    pub async fn on_auth_state(&mut self, identity: Option<Identity>) -> Result<()> {
        if let Some(views) = self.views.take() {
            views.close().await;
        }
        self.session = None;

        let event = match identity {
            Some(identity) => AuthEvent::SignedIn(identity),
            None => AuthEvent::SignedOut,
        };

        if let Some(session) = self.gate.handle_auth_event(event).await? {
            let views = SubscriptionManager::open(self.store.clone(), &session).await?;
            self.views = Some(views);
            self.session = Some(session);
        }

        Ok(())
    }

    /// Watch the personal history view. `None` before authorization.
    pub fn history(&self) -> Option<watch::Receiver<HistorySnapshot>> {
        self.views.as_ref().map(|v| v.history())
    }

    /// Watch the global ranking view. `None` before authorization.
    pub fn ranking(&self) -> Option<watch::Receiver<Vec<RankingEntry>>> {
        self.views.as_ref().map(|v| v.ranking())
    }

    /// Submit one measurement using the latest history snapshot.
    ///
    /// On success the caller resets its form; the next default week
    /// arrives reactively with the refreshed snapshot.
    pub async fn submit(&self, form: &SubmissionForm) -> Result<SubmissionPlan> {
        let (session, views) = match (&self.session, &self.views) {
            (Some(session), Some(views)) => (session, views),
            _ => return Err(AppError::AuthorizationDenied),
        };

        let history = views.latest_history();
        self.pipeline.submit(session, &history.records, form).await
    }
}
