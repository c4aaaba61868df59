//! Logging setup.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{BridgeError, Result};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,tower_http=info";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter` when it is set.
pub fn init(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| BridgeError::Internal(format!("Invalid log filter: {}", e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()
        .map_err(|e| BridgeError::Internal(format!("Failed to install logger: {}", e)))?;

    Ok(())
}
