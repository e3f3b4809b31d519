//! Remote synchronization orchestration
//!
//! Push-after-mutation and pull-on-sign-in share one rule: at most one sync
//! operation is in flight per manager. The guard is an atomic flag held by a
//! `SyncPermit` whose `Drop` releases it, so a cancelled or timed-out sync
//! can never wedge the manager in a permanently "syncing" state.

use super::DataManager;
use crate::events::{DataEvent, SyncStatus};
use crate::remote::{RemoteError, RemoteSnapshot};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Exclusive right to run one sync operation; released on drop
pub(crate) struct SyncPermit {
    flag: Arc<AtomicBool>,
}

impl SyncPermit {
    pub(crate) fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for SyncPermit {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl DataManager {
    /// Copy of every collection, in the remote document shape
    pub fn snapshot(&self) -> RemoteSnapshot {
        RemoteSnapshot {
            bp_sessions: self.bp_sessions.clone(),
            fitness_sessions: self.fitness_sessions.clone(),
            health_metrics: self.health_metrics.clone(),
            nutrition_entries: self.nutrition_entries.clone(),
            nutrition_goals: self.nutrition_goals.clone(),
            custom_workouts: self.custom_workouts.clone(),
            custom_exercises: self.custom_exercises.clone(),
            nutrition_templates: self.nutrition_templates.clone(),
            health_notes: self.health_notes.clone(),
        }
    }

    /// Replace every collection with the remote snapshot, persist locally,
    /// and notify observers (last-write-wins: no merge)
    fn apply_snapshot(&mut self, snapshot: RemoteSnapshot) {
        self.bp_sessions = snapshot.bp_sessions;
        self.fitness_sessions = snapshot.fitness_sessions;
        self.health_metrics = snapshot.health_metrics;
        self.nutrition_entries = snapshot.nutrition_entries;
        self.nutrition_goals = snapshot.nutrition_goals;
        self.custom_workouts = snapshot.custom_workouts;
        self.custom_exercises = snapshot.custom_exercises;
        self.nutrition_templates = snapshot.nutrition_templates;
        self.health_notes = snapshot.health_notes;
        self.persist_all();

        let _ = self.events_tx.send(DataEvent::BpSessionsChanged);
        let _ = self.events_tx.send(DataEvent::FitnessSessionsChanged);
        let _ = self.events_tx.send(DataEvent::MetricsChanged);
        let _ = self.events_tx.send(DataEvent::NutritionChanged);
        let _ = self.events_tx.send(DataEvent::TemplatesChanged);
        let _ = self.events_tx.send(DataEvent::NotesChanged);
    }

    /// Spawn a push of the current snapshot, unless signed out, no runtime
    /// is available, or another sync already holds the guard
    pub(crate) fn schedule_push(&self) {
        if !self.remote.is_authenticated() {
            return;
        }
        let Some(user_id) = self.remote.current_user_id() else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime; skipping remote push");
            return;
        };
        let Some(permit) = SyncPermit::acquire(&self.sync_in_flight) else {
            debug!("push skipped, a sync is already in flight");
            return;
        };

        let snapshot = self.snapshot();
        let remote = Arc::clone(&self.remote);
        let status = self.status_tx.clone();

        handle.spawn(async move {
            let _permit = permit;
            let _ = status.send(SyncStatus::Syncing);
            match remote.push(&user_id, &snapshot).await {
                Ok(()) => {
                    let _ = status.send(SyncStatus::Synced { at: Utc::now() });
                }
                Err(e) => {
                    warn!(error = %e, "remote push failed, keeping local data");
                    let _ = status.send(SyncStatus::Failed {
                        message: e.to_string(),
                    });
                }
            }
        });
    }

    /// Pull the remote snapshot and replace local state with it. A missing
    /// remote document seeds the remote from local instead. Returns whether
    /// the sync completed.
    pub async fn resync(&mut self) -> bool {
        if !self.remote.is_authenticated() {
            return false;
        }
        let Some(user_id) = self.remote.current_user_id() else {
            return false;
        };
        let Some(_permit) = SyncPermit::acquire(&self.sync_in_flight) else {
            debug!("resync skipped, a sync is already in flight");
            return false;
        };

        let _ = self.status_tx.send(SyncStatus::Syncing);
        let remote = Arc::clone(&self.remote);
        let pulled = remote.pull(&user_id).await;

        match pulled {
            Ok(snapshot) => {
                self.apply_snapshot(snapshot);
                info!(user_id, "resync complete, local state replaced");
                let _ = self.status_tx.send(SyncStatus::Synced { at: Utc::now() });
                true
            }
            Err(RemoteError::NotFound) => {
                // First sync for this account: the remote has no document
                // yet, so local data becomes the initial upload.
                let snapshot = self.snapshot();
                match remote.push(&user_id, &snapshot).await {
                    Ok(()) => {
                        info!(user_id, "seeded remote from local data");
                        let _ = self.status_tx.send(SyncStatus::Synced { at: Utc::now() });
                        true
                    }
                    Err(e) => {
                        warn!(error = %e, "seeding remote failed, keeping local data");
                        let _ = self.status_tx.send(SyncStatus::Failed {
                            message: e.to_string(),
                        });
                        false
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "resync pull failed, keeping local data");
                let _ = self.status_tx.send(SyncStatus::Failed {
                    message: e.to_string(),
                });
                false
            }
        }
    }

    /// Sign-in reaction: debounce briefly so auth state settles, then run a
    /// time-bounded resync. A timeout leaves local data untouched.
    pub async fn handle_sign_in(&mut self) -> bool {
        tokio::time::sleep(Duration::from_millis(self.sync.sign_in_debounce_ms)).await;

        let limit = Duration::from_secs(self.sync.resync_timeout_secs);
        let outcome = tokio::time::timeout(limit, self.resync()).await;
        match outcome {
            Ok(completed) => completed,
            Err(_) => {
                warn!("sign-in resync timed out, keeping local data");
                let _ = self.status_tx.send(SyncStatus::Failed {
                    message: "sign-in sync timed out".to_string(),
                });
                false
            }
        }
    }
}
