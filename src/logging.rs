//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set; otherwise the configured `server.log_level`
//! directive is used. Production emits JSON lines, everything else a
//! human-readable format.

use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_logging(server: &ServerConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if server.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_target(true)
            .with_current_span(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .try_init()
    };

    if result.is_ok() {
        tracing::info!(
            environment = ?server.environment,
            log_level = %server.log_level,
            "Logging initialized"
        );
    }
}
