//! Observable state: change notifications and sync status
//!
//! The UI requirement is "redraw when state changes", served here by a
//! broadcast channel of coarse per-collection events plus a watch channel
//! carrying the latest sync status. Neither exposes the live collections.

use chrono::{DateTime, Utc};

/// Which collection changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataEvent {
    BpSessionsChanged,
    FitnessSessionsChanged,
    MetricsChanged,
    NutritionChanged,
    TemplatesChanged,
    NotesChanged,
}

/// Latest known state of remote synchronization
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    /// No sync has run yet
    Idle,
    /// A push or resync is in flight
    Syncing,
    /// The last sync completed
    Synced { at: DateTime<Utc> },
    /// The last sync failed; the engine continues on local data
    Failed { message: String },
}

impl SyncStatus {
    pub fn is_syncing(&self) -> bool {
        matches!(self, SyncStatus::Syncing)
    }

    /// The last sync error, if the most recent attempt failed
    pub fn last_error(&self) -> Option<&str> {
        match self {
            SyncStatus::Failed { message } => Some(message),
            _ => None,
        }
    }
}
