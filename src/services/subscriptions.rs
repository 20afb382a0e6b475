// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live derived views over the remote document set.
//!
//! Once a session is authorized, exactly two views are open: the personal
//! history and the global ranking. Each store delivery fully replaces the
//! previous snapshot; consumers watch the channels and recompute derived
//! state per emission. The views are read-only projections and never
//! write to the store.

use crate::db::{DocumentStore, Subscription};
use crate::error::Result;
use crate::metrics;
use crate::models::ranking::sort_leaderboard;
use crate::models::record::sort_history;
use crate::models::{RankingEntry, TrackingRecord};
use crate::services::session::Session;
use futures_util::future::join_all;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// One complete history result set, sorted ascending by week.
#[derive(Debug, Clone)]
pub struct HistorySnapshot {
    /// Records in chart order (ascending by week)
    pub records: Vec<TrackingRecord>,
    /// Pre-populated default week for the next submission (count + 1)
    pub next_week: u32,
}

impl Default for HistorySnapshot {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_week: 1,
        }
    }
}

impl HistorySnapshot {
    fn from_records(mut records: Vec<TrackingRecord>) -> Self {
        sort_history(&mut records);
        let next_week = records.len() as u32 + 1;
        Self { records, next_week }
    }

    /// Weight from the most recent record, if any.
    pub fn current_weight(&self) -> Option<f64> {
        self.records.last().map(|r| r.weight_kg)
    }

    /// Weight from the earliest record, if any.
    pub fn initial_weight(&self) -> Option<f64> {
        self.records.first().map(|r| r.weight_kg)
    }

    /// Total lost between the earliest and latest record (dashboard card).
    pub fn total_lost(&self) -> f64 {
        match (self.initial_weight(), self.current_weight()) {
            (Some(initial), Some(current)) => metrics::total_lost_for(initial, current),
            _ => 0.0,
        }
    }
}

/// Owns the two live views of an authorized session.
///
/// Dropping the manager without [`SubscriptionManager::close`] aborts the
/// republishing tasks but leaks the backing listeners, so `close` is the
/// expected teardown path.
pub struct SubscriptionManager {
    history_rx: watch::Receiver<HistorySnapshot>,
    ranking_rx: watch::Receiver<Vec<RankingEntry>>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
    subscriptions: Vec<Box<dyn Subscription>>,
}

impl SubscriptionManager {
    /// Open both views for an authorized session.
    ///
    /// Takes a [`Session`] (not a bare uid) so views can only ever be
    /// opened after the gate has resolved authorization.
    pub async fn open(store: Arc<dyn DocumentStore>, session: &Session) -> Result<Self> {
        let cancel = CancellationToken::new();

        let (history_tx, history_rx) = watch::channel(HistorySnapshot::default());
        let (raw_history_tx, raw_history_rx) = mpsc::unbounded_channel();
        let history_sub = store
            .subscribe_tracking(&session.identity.uid, raw_history_tx)
            .await?;
        let history_task = tokio::spawn(republish(
            cancel.clone(),
            raw_history_rx,
            history_tx,
            HistorySnapshot::from_records,
        ));

        let (ranking_tx, ranking_rx) = watch::channel(Vec::new());
        let (raw_ranking_tx, raw_ranking_rx) = mpsc::unbounded_channel();
        let ranking_sub = store.subscribe_ranking(raw_ranking_tx).await?;
        let ranking_task = tokio::spawn(republish(
            cancel.clone(),
            raw_ranking_rx,
            ranking_tx,
            ranking_snapshot,
        ));

        tracing::info!(uid = %session.identity.uid, "Live views opened");

        Ok(Self {
            history_rx,
            ranking_rx,
            cancel,
            tasks: vec![history_task, ranking_task],
            subscriptions: vec![history_sub, ranking_sub],
        })
    }

    /// Watch the personal history snapshots.
    pub fn history(&self) -> watch::Receiver<HistorySnapshot> {
        self.history_rx.clone()
    }

    /// Watch the global ranking snapshots.
    pub fn ranking(&self) -> watch::Receiver<Vec<RankingEntry>> {
        self.ranking_rx.clone()
    }

    /// Latest history snapshot (the mutation pipeline's input).
    pub fn latest_history(&self) -> HistorySnapshot {
        self.history_rx.borrow().clone()
    }

    /// Tear down both views. Late deliveries from the store are dropped,
    /// never applied to a later session's state.
    pub async fn close(self) {
        self.cancel.cancel();
        for subscription in self.subscriptions {
            subscription.unsubscribe().await;
        }
        let _ = join_all(self.tasks).await;
        tracing::info!("Live views closed");
    }
}

fn ranking_snapshot(mut entries: Vec<RankingEntry>) -> Vec<RankingEntry> {
    sort_leaderboard(&mut entries);
    entries
}

/// Fold raw store deliveries into published snapshots until cancelled.
async fn republish<T, S>(
    cancel: CancellationToken,
    mut rx: mpsc::UnboundedReceiver<Vec<T>>,
    tx: watch::Sender<S>,
    project: fn(Vec<T>) -> S,
) where
    T: Send + 'static,
    S: Send + Sync + 'static,
{
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            delivery = rx.recv() => match delivery {
                Some(docs) => {
                    let _ = tx.send(project(docs));
                }
                None => break,
            },
        }
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

    #[test]
    fn test_snapshot_sorts_and_prepopulates_next_week() {
        let snapshot =
            HistorySnapshot::from_records(vec![record(2, 89.0), record(1, 90.0), record(3, 88.0)]);
        let weeks: Vec<u32> = snapshot.records.iter().map(|r| r.week).collect();
        assert_eq!(weeks, vec![1, 2, 3]);
        assert_eq!(snapshot.next_week, 4);
    }

    #[test]
    fn test_empty_snapshot_defaults_to_week_one() {
        let snapshot = HistorySnapshot::default();
        assert_eq!(snapshot.next_week, 1);
        assert_eq!(snapshot.current_weight(), None);
        assert_eq!(snapshot.total_lost(), 0.0);
    }

    #[test]
    fn test_dashboard_helpers() {
        let snapshot =
            HistorySnapshot::from_records(vec![record(1, 90.0), record(2, 88.5)]);
        assert_eq!(snapshot.initial_weight(), Some(90.0));
        assert_eq!(snapshot.current_weight(), Some(88.5));
        assert_eq!(snapshot.total_lost(), 1.5);
    }
}
