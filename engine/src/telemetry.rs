//! Tracing setup for host applications embedding the engine

use crate::config::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging
///
/// JSON output in production, pretty output in development. `RUST_LOG`
/// overrides the default filter. Call once per process.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if AppConfig::is_production() {
            "vitaltrack_engine=info".into()
        } else {
            "vitaltrack_engine=debug".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
