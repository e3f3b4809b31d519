//! VitalTrack engine
//!
//! The data-management layer behind the VitalTrack apps: owns the in-memory
//! health collections, validates and persists every mutation locally, and
//! mirrors signed-in accounts to the remote document store with
//! last-write-wins semantics.
//!
//! Domain records and analytics live in `vitaltrack-shared`; this crate adds
//! the manager, storage adapters, remote sync, and configuration.

pub mod config;
pub mod events;
pub mod manager;
pub mod remote;
pub mod sensor;
pub mod store;
pub mod telemetry;

pub use config::AppConfig;
pub use events::{DataEvent, SyncStatus};
pub use manager::DataManager;
pub use remote::{HttpRemoteStore, MemoryRemoteStore, RemoteError, RemoteSnapshot, RemoteStore};
pub use sensor::{SensorError, SensorSample, SensorSource};
pub use store::{FileStore, LocalStore, MemoryStore, StoreError};
