// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end flows through the application core: sign-in, live views,
//! submissions, session switches, sign-out.

use std::sync::Arc;
use tirzeflow::db::MemoryStore;
use tirzeflow::error::AppError;
use tirzeflow::services::SubmissionForm;
use tirzeflow::App;

mod common;
use common::{identity, init_logging, wait_for, FakeIdentityProvider};

fn form(week: u32, weight: &str) -> SubmissionForm {
    SubmissionForm {
        week,
        weight: weight.to_string(),
        date: "2026-01-05".to_string(),
    }
}

#[tokio::test]
async fn test_sign_in_submit_and_reactive_next_week() {
    init_logging();
    let store = MemoryStore::new();
    let auth = Arc::new(FakeIdentityProvider::new(Some(identity(
        "u1",
        Some("u1@example.com"),
    ))));
    let mut app = App::new(Arc::new(store.clone()), auth);

    assert!(!app.is_authorized());
    assert!(app.history().is_none());
    assert!(matches!(
        app.submit(&form(1, "90")).await,
        Err(AppError::AuthorizationDenied)
    ));

    app.sign_in("credential").await.unwrap();
    assert!(app.is_authorized());

    let mut history = app.history().unwrap();
    let snapshot = wait_for(&mut history, |s| s.next_week == 1).await;
    assert!(snapshot.records.is_empty());

    app.submit(&form(1, "90")).await.unwrap();
    let snapshot = wait_for(&mut history, |s| s.next_week == 2).await;
    assert_eq!(snapshot.current_weight(), Some(90.0));

    // The pipeline fed the refreshed snapshot back in: the second
    // submission keeps the fixed initial weight.
    app.submit(&form(2, "88.5")).await.unwrap();
    wait_for(&mut history, |s| s.next_week == 3).await;
    let entry = store.ranking_entry("u1").unwrap();
    assert_eq!(entry.initial_weight_kg, 90.0);
    assert_eq!(entry.total_lost_kg, 1.5);

    let mut ranking = app.ranking().unwrap();
    let leaderboard = wait_for(&mut ranking, |es| !es.is_empty()).await;
    assert_eq!(leaderboard[0].uid, "u1");
}

#[tokio::test]
async fn test_denied_sign_in_leaves_app_signed_out() {
    let store = MemoryStore::new();
    // Identity with no verified email and no profile document: denied.
    let auth = Arc::new(FakeIdentityProvider::new(Some(identity("u1", None))));
    let mut app = App::new(Arc::new(store), auth.clone());

    let result = app.sign_in("credential").await;
    assert!(matches!(result, Err(AppError::AuthorizationDenied)));
    assert!(!app.is_authorized());
    assert!(app.history().is_none());
    assert_eq!(auth.sign_out_count(), 1);
}

#[tokio::test]
async fn test_rejected_credential_surfaces_sign_in_failure() {
    let store = MemoryStore::new();
    let auth = Arc::new(FakeIdentityProvider::new(None));
    let mut app = App::new(Arc::new(store), auth);

    let result = app.sign_in("bad-credential").await;
    assert!(matches!(result, Err(AppError::SignInFailure(_))));
    assert!(!app.is_authorized());
}

#[tokio::test]
async fn test_identity_switch_tears_down_previous_views() {
    let store = MemoryStore::new();
    let auth = Arc::new(FakeIdentityProvider::new(Some(identity(
        "u1",
        Some("u1@example.com"),
    ))));
    let mut app = App::new(Arc::new(store.clone()), auth);

    app.sign_in("credential").await.unwrap();
    app.submit(&form(1, "90")).await.unwrap();
    let mut old_history = app.history().unwrap();
    wait_for(&mut old_history, |s| s.next_week == 2).await;

    app.on_auth_state(Some(identity("u2", Some("u2@example.com"))))
        .await
        .unwrap();
    assert_eq!(app.session().unwrap().identity.uid, "u2");

    // Fresh views start from the new user's empty history.
    let mut history = app.history().unwrap();
    let snapshot = wait_for(&mut history, |s| s.records.is_empty()).await;
    assert_eq!(snapshot.next_week, 1);

    // Writes after the switch never reach the old session's view.
    app.submit(&form(1, "95")).await.unwrap();
    wait_for(&mut history, |s| s.next_week == 2).await;
    assert_eq!(old_history.borrow_and_update().next_week, 2);
    assert_eq!(store.tracking_records("u1").len(), 1);
    assert_eq!(store.tracking_records("u2").len(), 1);
}

#[tokio::test]
async fn test_sign_out_clears_session_and_views() {
    let store = MemoryStore::new();
    let auth = Arc::new(FakeIdentityProvider::new(Some(identity(
        "u1",
        Some("u1@example.com"),
    ))));
    let mut app = App::new(Arc::new(store), auth.clone());

    app.sign_in("credential").await.unwrap();
    app.sign_out().await.unwrap();

    assert!(!app.is_authorized());
    assert!(app.history().is_none());
    assert!(app.ranking().is_none());
    assert_eq!(auth.sign_out_count(), 1);
}
