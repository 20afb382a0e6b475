// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session gate: resolves authorization for external auth-state changes.

use crate::db::DocumentStore;
use crate::error::{AppError, Result};
use crate::models::Identity;
use crate::services::google_identity::IdentityProvider;
use std::sync::Arc;

/// An external auth-state change, as delivered by the identity provider.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(Identity),
    SignedOut,
}

/// An authorized session. Only the gate constructs these, so holding a
/// `Session` implies the authorization check already passed.
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
}

/// Resolves identity + authorization state from auth events.
///
/// Authorization passes when the identity's profile document exists or
/// the identity carries a verified email. This policy is deliberately
/// permissive (see DESIGN.md): any verified email self-authorizes and
/// the first submission then creates the profile document.
pub struct SessionGate {
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn IdentityProvider>,
}

impl SessionGate {
    pub fn new(store: Arc<dyn DocumentStore>, auth: Arc<dyn IdentityProvider>) -> Self {
        Self { store, auth }
    }

    /// Resolve one auth-state change to a session (or none).
    ///
    /// The profile lookup completes before this returns, so callers can
    /// safely open subscriptions once they hold a `Session`. A denied
    /// identity is signed out of the external provider; no
    /// half-authenticated session is left behind.
    pub async fn handle_auth_event(&self, event: AuthEvent) -> Result<Option<Session>> {
        match event {
            AuthEvent::SignedOut => {
                tracing::debug!("Auth state cleared");
                Ok(None)
            }
            AuthEvent::SignedIn(identity) => {
                let profile = self.store.get_profile(&identity.uid).await?;

                if profile.is_some() || identity.email.is_some() {
                    tracing::info!(
                        uid = %identity.uid,
                        via_profile = profile.is_some(),
                        "Session authorized"
                    );
                    Ok(Some(Session { identity }))
                } else {
                    tracing::warn!(uid = %identity.uid, "Authorization denied");
                    self.auth.sign_out().await;
                    Err(AppError::AuthorizationDenied)
                }
            }
        }
    }
}
