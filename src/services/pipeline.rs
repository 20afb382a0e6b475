// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Record mutation pipeline.
//!
//! Turns one submitted form into three document writes: the tracking
//! record, the caller's ranking entry, and a profile merge. The writes
//! are issued sequentially with no cross-document transaction; a failure
//! aborts the remaining writes but does not roll back completed ones
//! (the store's live views re-deliver whatever actually landed).

use crate::db::DocumentStore;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{Identity, RankingEntry, TrackingRecord, UserProfile};
use crate::services::session::Session;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// Pending form state: week is pre-populated from the history snapshot,
/// weight arrives as the raw input string.
#[derive(Debug, Clone)]
pub struct SubmissionForm {
    pub week: u32,
    pub weight: String,
    pub date: String,
}

/// The three documents a validated submission writes.
#[derive(Debug, Clone)]
pub struct SubmissionPlan {
    pub record: TrackingRecord,
    pub ranking: RankingEntry,
    pub profile: UserProfile,
}

/// Validate a form and derive the documents to write.
///
/// `history` is the current personal-history snapshot; its earliest
/// record fixes `initial_weight_kg`, or the submitted weight does when
/// this is the first-ever record.
pub fn build_submission(
    identity: &Identity,
    history: &[TrackingRecord],
    form: &SubmissionForm,
    now: DateTime<Utc>,
) -> Result<SubmissionPlan> {
    if form.week < 1 {
        return Err(AppError::Validation("Week must be at least 1".to_string()));
    }

    let weight_kg: f64 = form
        .weight
        .trim()
        .parse()
        .map_err(|_| AppError::Validation("Weight must be a positive number".to_string()))?;
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(AppError::Validation(
            "Weight must be a positive number".to_string(),
        ));
    }

    if NaiveDate::parse_from_str(&form.date, "%Y-%m-%d").is_err() {
        return Err(AppError::Validation(
            "Date must be in YYYY-MM-DD format".to_string(),
        ));
    }

    let bmi = metrics::bmi_for(weight_kg)
        .ok_or_else(|| AppError::Validation("Weight must be a positive number".to_string()))?;
    let dose_mg = metrics::dose_for(form.week);
    let now_str = format_utc_rfc3339(now);

    let record = TrackingRecord {
        week: form.week,
        weight_kg,
        date: form.date.clone(),
        bmi,
        dose_mg,
        updated_at: now_str.clone(),
    };

    // First-ever record fixes the initial weight; afterwards the earliest
    // stored record owns it and later edits never recompute it.
    let initial_weight_kg = history
        .iter()
        .min_by_key(|r| r.week)
        .map(|r| r.weight_kg)
        .unwrap_or(weight_kg);

    let ranking = RankingEntry {
        uid: identity.uid.clone(),
        display_name: identity.display_name.clone(),
        photo_url: identity.photo_url.clone(),
        current_weight_kg: weight_kg,
        initial_weight_kg,
        total_lost_kg: metrics::total_lost_for(initial_weight_kg, weight_kg),
        last_updated: now_str.clone(),
    };

    let profile = UserProfile {
        email: identity.email.clone(),
        last_login: now_str,
    };

    Ok(SubmissionPlan {
        record,
        ranking,
        profile,
    })
}

/// Executes submission plans against the document store.
pub struct RecordPipeline {
    store: Arc<dyn DocumentStore>,
}

impl RecordPipeline {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Validate and persist one submission as three sequential writes.
    ///
    /// Local snapshot state is never mutated here; the live views
    /// re-fire once the writes land. On error the caller keeps the form
    /// open for a manual retry; no automatic retry is performed.
    pub async fn submit(
        &self,
        session: &Session,
        history: &[TrackingRecord],
        form: &SubmissionForm,
    ) -> Result<SubmissionPlan> {
        let plan = build_submission(&session.identity, history, form, Utc::now())?;
        let uid = &session.identity.uid;

        self.store.set_tracking_record(uid, &plan.record).await?;
        self.store.set_ranking_entry(&plan.ranking).await?;
        self.store.merge_profile(uid, &plan.profile).await?;

        tracing::info!(
            uid = %uid,
            week = plan.record.week,
            weight = plan.record.weight_kg,
            total_lost = plan.ranking.total_lost_kg,
            "Submission stored"
        );

        Ok(plan)
    }
}
