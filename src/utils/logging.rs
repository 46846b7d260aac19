//! Structured logging setup.
//!
//! The codec itself only emits `tracing` events; this installs a subscriber
//! for binaries and tests that want to see them. `RUST_LOG` takes precedence
//! over the configured level.

use crate::config::LoggingConfig;
use crate::error::{constants, PacketError, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a global subscriber built from `config`.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_lowercase()));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_format {
        subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| PacketError::ConfigError(format!("{}: {e}", constants::ERR_LOGGING_INIT)))?;
    } else {
        subscriber
            .with(fmt::layer())
            .try_init()
            .map_err(|e| PacketError::ConfigError(format!("{}: {e}", constants::ERR_LOGGING_INIT)))?;
    }

    info!(app = %config.app_name, level = %config.log_level, "Logging initialized");
    Ok(())
}
