// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod google_identity;
pub mod pipeline;
pub mod session;
pub mod subscriptions;

pub use google_identity::{GoogleIdentityProvider, IdentityProvider};
pub use pipeline::{build_submission, RecordPipeline, SubmissionForm, SubmissionPlan};
pub use session::{AuthEvent, Session, SessionGate};
pub use subscriptions::{HistorySnapshot, SubscriptionManager};
