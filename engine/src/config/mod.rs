//! Configuration for the VitalTrack engine
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: VT__)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub remote: RemoteConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Local blob storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory the per-collection blobs are written under
    pub data_dir: String,
}

/// Remote document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    /// Account id for a pre-provisioned session (headless use); interactive
    /// apps sign in at runtime instead
    #[serde(default)]
    pub user_id: Option<String>,
    /// Bearer token; absent means the engine starts local-only
    #[serde(default)]
    pub auth_token: Option<String>,
}

/// Sync orchestration tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Delay before a sign-in triggers a full resync
    pub sign_in_debounce_ms: u64,
    /// Wall-clock bound on a sign-in resync; past it, local data stands
    pub resync_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sign_in_debounce_ms: 500,
            resync_timeout_secs: 10,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_dir: "./data".to_string(),
            },
            remote: RemoteConfig {
                base_url: "http://localhost:8080".to_string(),
                user_id: None,
                auth_token: None,
            },
            sync: SyncConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with VT__ prefix
    ///    e.g., VT__SYNC__RESYNC_TIMEOUT_SECS=30 sets sync.resync_timeout_secs
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name(&config_file).required(false))
            .add_source(config::Environment::with_prefix("VT").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}
