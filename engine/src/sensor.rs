//! Health-sensor collaborator contract
//!
//! The platform health-data service is external; the engine only needs
//! read-only, per-metric range queries. An unauthorized or empty result is
//! ordinary, not an error the caller has to handle.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use vitaltrack_shared::MetricType;

/// One numeric sample from the platform health service
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSample {
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("health data access not authorized")]
    Unauthorized,

    #[error("sensor query failed: {0}")]
    Query(String),
}

/// Read-only range query over platform health data
#[async_trait]
pub trait SensorSource: Send + Sync {
    async fn samples(
        &self,
        metric_type: MetricType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SensorSample>, SensorError>;
}
