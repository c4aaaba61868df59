//! Ordered adapter chain.
//!
//! Adapters are tried in insertion order until one succeeds. Failures are
//! logged and collected; they only surface if every adapter fails.

use std::sync::Arc;

use tracing::{info, warn};

use crate::transport::Adapter;

/// Remediation appended to every exhausted-chain error.
pub const REMEDIATION_HINT: &str = "Please check the printer connection. In a container, run in \
     privileged mode with USB devices mounted, or configure the printer via \
     /api/printer/set-usb-ids or /api/printer/set-usb-device.";

/// One failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub adapter: &'static str,
    pub error: String,
}

/// Every adapter failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exhausted {
    pub attempts: Vec<Attempt>,
}

impl Exhausted {
    /// `Failed to print. <adapter>: <error>. ... <hint>`
    pub fn message(&self) -> String {
        let mut message = String::from("Failed to print. ");
        if self.attempts.is_empty() {
            message.push_str("No printer configured. ");
        }
        for attempt in &self.attempts {
            message.push_str(&format!(
                "{}: {}. ",
                attempt.adapter,
                attempt.error.trim_end_matches('.')
            ));
        }
        message.push_str(REMEDIATION_HINT);
        message
    }
}

#[derive(Default)]
pub struct FallbackChain {
    adapters: Vec<Arc<dyn Adapter>>,
}

impl FallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, adapter: Arc<dyn Adapter>) -> &mut Self {
        self.adapters.push(adapter);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Try each adapter in turn; first success wins.
    pub async fn run(&self, text: &str, cut: bool) -> Result<String, Exhausted> {
        let mut exhausted = Exhausted::default();

        for adapter in &self.adapters {
            match adapter.send(text, cut).await {
                Ok(message) => {
                    info!(adapter = adapter.name(), %message, "Print succeeded");
                    return Ok(message);
                }
                Err(e) => {
                    warn!(adapter = adapter.name(), error = %e, "Print attempt failed, trying next");
                    exhausted.attempts.push(Attempt {
                        adapter: adapter.name(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Err(exhausted)
    }
}
