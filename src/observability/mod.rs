//! # Observability Infrastructure
//!
//! Structured logging for the Gatehouse service via the tracing ecosystem.
//! Metrics and distributed-trace export are intentionally absent; the
//! service's observability surface is its structured log stream.

use crate::config::{AppConfig, ObservabilityConfig};
use crate::errors::{GatehouseError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// The filter honors `RUST_LOG` when set, falling back to the configured
/// log level. Call once at startup, before anything logs.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| GatehouseError::config(format!("Invalid log level: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_logging {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    result.map_err(|e| {
        GatehouseError::config(format!("Failed to initialize tracing subscriber: {}", e))
    })
}

/// Log the effective configuration at startup
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        service_name = %config.observability.service_name,
        server_address = %config.server.bind_address(),
        database_url = %config.database.url,
        auto_migrate = config.database.auto_migrate,
        access_token_ttl_minutes = config.auth.access_token_ttl_minutes,
        refresh_token_ttl_days = config.auth.refresh_token_ttl_days,
        "Gatehouse service configuration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_info() {
        let config = AppConfig::default();

        // Should not panic even without an initialized subscriber
        log_config_info(&config);
    }
}
