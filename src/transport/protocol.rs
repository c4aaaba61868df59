//! Protocol handle and the adapters that drive it.
//!
//! A [`ProtocolHandle`] is an ESC/POS line printer bound to one link: either
//! a device path chosen through the configuration API, or the TCP fallback
//! built at startup. It issues clear → align left → print line → cut →
//! execute for plain text, and exposes [`ProtocolHandle::execute`] for
//! richer jobs such as formatted receipts.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{Adapter, PrinterLink, TransportResult};
use crate::error::BridgeError;
use crate::printer::PrinterState;
use crate::protocol::EscPosBuilder;
use crate::protocol::builder::DEFAULT_COLUMNS;

/// What a protocol handle was constructed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleKind {
    /// Device path chosen through configuration
    Device(String),
    /// Startup TCP fallback
    Tcp(String),
}

/// Open ESC/POS printer bound to a link.
pub struct ProtocolHandle {
    kind: HandleKind,
    link: Arc<dyn PrinterLink>,
    columns: usize,
}

impl std::fmt::Debug for ProtocolHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolHandle")
            .field("kind", &self.kind)
            .field("endpoint", &self.link.endpoint())
            .finish()
    }
}

impl ProtocolHandle {
    pub fn new(kind: HandleKind, link: Arc<dyn PrinterLink>) -> Self {
        Self {
            kind,
            link,
            columns: DEFAULT_COLUMNS,
        }
    }

    pub fn kind(&self) -> &HandleKind {
        &self.kind
    }

    /// Device path, if this handle was built from one.
    pub fn device_path(&self) -> Option<&str> {
        match &self.kind {
            HandleKind::Device(path) => Some(path),
            HandleKind::Tcp(_) => None,
        }
    }

    /// Empty job sized for this printer.
    pub fn job(&self) -> EscPosBuilder {
        EscPosBuilder::new(self.columns)
    }

    /// Send a finished job.
    pub async fn execute(&self, job: EscPosBuilder) -> Result<(), BridgeError> {
        self.link.write(&job.build()).await
    }

    /// clear → align left → print → cut → execute.
    pub async fn print_text(&self, text: &str, cut: bool) -> Result<(), BridgeError> {
        let mut job = self.job();
        job.clear();
        job.align_left();
        job.println(text);
        if cut {
            job.cut();
        }
        self.execute(job).await
    }
}

/// Adapter 2: the configured device-path handle.
pub struct ProtocolAdapter {
    handle: Arc<ProtocolHandle>,
}

impl ProtocolAdapter {
    pub fn new(handle: Arc<ProtocolHandle>) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl Adapter for ProtocolAdapter {
    fn name(&self) -> &'static str {
        "USB device"
    }

    async fn send(&self, text: &str, cut: bool) -> TransportResult {
        let endpoint = self.handle.link.endpoint();
        match self.handle.print_text(text, cut).await {
            Ok(()) => Ok(format!("Printed via USB device: {}", endpoint)),
            Err(e) => {
                warn!(device = %endpoint, error = %e, "Direct USB print failed");
                Err(BridgeError::Transport(e.to_string()))
            }
        }
    }
}

/// Adapter 4: the default (TCP fallback) handle, built on first use if the
/// startup handle is missing.
pub struct DefaultHandleAdapter {
    state: Arc<PrinterState>,
}

impl DefaultHandleAdapter {
    pub fn new(state: Arc<PrinterState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Adapter for DefaultHandleAdapter {
    fn name(&self) -> &'static str {
        "Thermal printer"
    }

    async fn send(&self, text: &str, cut: bool) -> TransportResult {
        let handle = match self.state.ensure_handle().await {
            Some(handle) if handle.device_path().is_none() => handle,
            _ => return Err(BridgeError::Transport("No printer configured".to_string())),
        };

        info!(endpoint = %handle.link.endpoint(), "Trying default protocol handle");
        handle
            .print_text(text, cut)
            .await
            .map(|()| "Print job sent successfully".to_string())
            .map_err(|e| BridgeError::Transport(e.to_string()))
    }
}
