//! # Error Types
//!
//! This module defines the error type used throughout the bridge.
//!
//! | Variant | Meaning | HTTP |
//! |---------|---------|------|
//! | `InvalidInput` | Missing request field, nonexistent device path | 400 |
//! | `Transport` | One adapter failed; triggers the next fallback | 500 |
//! | `ExhaustedFallback` | Every adapter failed | 500 |
//! | `Internal` | Unexpected fault while handling a request | 500 |

use thiserror::Error;

/// Main error type for bridge operations
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Request is missing a required field or names something that doesn't exist
    #[error("{0}")]
    InvalidInput(String),

    /// A single transport adapter failed
    #[error("{0}")]
    Transport(String),

    /// Every adapter in the fallback chain failed
    #[error("{0}")]
    ExhaustedFallback(String),

    /// Unexpected fault
    #[error("{0}")]
    Internal(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether the fault lies with the caller rather than the bridge.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Result alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
