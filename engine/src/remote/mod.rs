//! Remote document store contract
//!
//! The engine only requires push/pull of a whole-account snapshot plus an
//! authentication query. Conflict policy is last-write-wins: pull replaces
//! local collections, push replaces the remote document. No merge, no
//! pagination, no retry.

pub mod http;
pub mod memory;

pub use http::HttpRemoteStore;
pub use memory::MemoryRemoteStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vitaltrack_shared::{
    BpSession, CustomExercise, CustomNutritionTemplate, CustomWorkout, FitnessSession,
    HealthMetric, HealthNote, NutritionEntry, NutritionGoals,
};

/// Everything synced for one account, pushed and pulled as a single document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteSnapshot {
    #[serde(default)]
    pub bp_sessions: Vec<BpSession>,
    #[serde(default)]
    pub fitness_sessions: Vec<FitnessSession>,
    #[serde(default)]
    pub health_metrics: Vec<HealthMetric>,
    #[serde(default)]
    pub nutrition_entries: Vec<NutritionEntry>,
    #[serde(default)]
    pub nutrition_goals: Option<NutritionGoals>,
    #[serde(default)]
    pub custom_workouts: Vec<CustomWorkout>,
    #[serde(default)]
    pub custom_exercises: Vec<CustomExercise>,
    #[serde(default)]
    pub nutrition_templates: Vec<CustomNutritionTemplate>,
    #[serde(default)]
    pub health_notes: Vec<HealthNote>,
}

/// Remote sync error
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),

    #[error("not authenticated")]
    Unauthorized,

    #[error("no remote snapshot exists for this account")]
    NotFound,

    #[error("server error: status {status}")]
    Server { status: u16 },

    #[error("failed to decode remote snapshot: {0}")]
    Decode(String),
}

/// The document-database collaborator, seen from the engine
///
/// Implementations are stateless with respect to domain data: they receive
/// and return copies and never hold references into the manager's state.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Replace the remote document with this snapshot (one batch call)
    async fn push(&self, user_id: &str, snapshot: &RemoteSnapshot) -> Result<(), RemoteError>;

    /// Fetch the authoritative remote snapshot
    async fn pull(&self, user_id: &str) -> Result<RemoteSnapshot, RemoteError>;

    /// Whether a remote session is currently signed in
    fn is_authenticated(&self) -> bool;

    /// The signed-in account id, if any
    fn current_user_id(&self) -> Option<String>;
}
