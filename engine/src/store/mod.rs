//! Local persistence: one named blob per collection
//!
//! The store is a plain key-value byte interface with no cross-collection
//! transactionality: a crash between two `put` calls can leave collections
//! mutually inconsistent, which is accepted behavior for a local cache.

pub mod codec;
pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Storage error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Byte-level key-value store for per-collection blobs
///
/// Implementations are stateless with respect to domain data: they receive
/// and return copies, never references into the manager's live collections.
pub trait LocalStore: Send + Sync {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Blob names, one per synced collection
pub mod keys {
    pub const BP_SESSIONS: &str = "bp_sessions";
    pub const FITNESS_SESSIONS: &str = "fitness_sessions";
    pub const HEALTH_METRICS: &str = "health_metrics";
    pub const NUTRITION_ENTRIES: &str = "nutrition_entries";
    pub const NUTRITION_GOALS: &str = "nutrition_goals";
    pub const CUSTOM_WORKOUTS: &str = "custom_workouts";
    pub const CUSTOM_EXERCISES: &str = "custom_exercises";
    pub const NUTRITION_TEMPLATES: &str = "nutrition_templates";
    pub const HEALTH_NOTES: &str = "health_notes";
}
