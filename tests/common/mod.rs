// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tirzeflow::db::FirestoreDb;
use tirzeflow::error::{AppError, Result};
use tirzeflow::models::Identity;
use tirzeflow::services::IdentityProvider;
use tokio::sync::watch;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Initialize test logging (idempotent).
#[allow(dead_code)]
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tirzeflow=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Build a test identity.
#[allow(dead_code)]
pub fn identity(uid: &str, email: Option<&str>) -> Identity {
    Identity {
        uid: uid.to_string(),
        display_name: format!("User {}", uid),
        email: email.map(String::from),
        photo_url: Some(format!("https://example.com/{}.jpg", uid)),
    }
}

/// Scripted identity provider that records forced sign-outs.
pub struct FakeIdentityProvider {
    identity: Mutex<Option<Identity>>,
    sign_outs: AtomicUsize,
}

#[allow(dead_code)]
impl FakeIdentityProvider {
    pub fn new(identity: Option<Identity>) -> Self {
        Self {
            identity: Mutex::new(identity),
            sign_outs: AtomicUsize::new(0),
        }
    }

    pub fn sign_out_count(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn sign_in(&self, _credential: &str) -> Result<Identity> {
        self.identity
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::SignInFailure("scripted rejection".to_string()))
    }

    async fn sign_out(&self) {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
    }
}

/// Wait until a watched snapshot satisfies the predicate, or time out.
#[allow(dead_code)]
pub async fn wait_for<T, F>(rx: &mut watch::Receiver<T>, pred: F) -> T
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            {
                let current = rx.borrow_and_update();
                if pred(&current) {
                    return current.clone();
                }
            }
            rx.changed().await.expect("watch channel closed");
        }
    })
    .await
    .expect("timed out waiting for snapshot")
}
