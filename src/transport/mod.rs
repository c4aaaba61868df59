//! # Printer Transport Layer
//!
//! Strategies for delivering text to a physical printer.
//!
//! ## Adapters
//!
//! Every adapter honours the same contract: [`Adapter::send`] takes text and
//! a cut flag and returns a [`TransportResult`]. Adapters never panic on
//! device trouble; faults come back as `Err(BridgeError::Transport(..))`.
//!
//! | Priority | Adapter | Active when |
//! |----------|---------|-------------|
//! | 1 | [`UsbIdAdapter`] | vendor and product IDs are configured |
//! | 2 | [`ProtocolAdapter`] | a device-path protocol handle exists |
//! | 3 | [`SpoolerAdapter`] | always |
//! | 4 | [`DefaultHandleAdapter`] | no device-path handle exists |
//!
//! ## Links
//!
//! The protocol handle writes its byte stream through a [`PrinterLink`]:
//!
//! - [`device`]: character device (USB printer class node, USB-serial)
//! - [`network`]: raw TCP, port 9100 style

pub mod device;
pub mod network;
pub mod protocol;
pub mod spooler;
pub mod usb_ids;

pub use device::DeviceLink;
pub use network::NetworkLink;
pub use protocol::{DefaultHandleAdapter, HandleKind, ProtocolAdapter, ProtocolHandle};
pub use spooler::{LpSpooler, SpoolerAdapter, SpoolerClient};
pub use usb_ids::{HelperProcess, UsbIdAdapter, UsbIdPrinter};

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::error::BridgeError;

/// Outcome of one delivery attempt: `Ok(message)` or the failure.
pub type TransportResult = Result<String, BridgeError>;

/// One strategy for delivering text to a printer.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Short label used in logs and aggregated error messages.
    fn name(&self) -> &'static str;

    async fn send(&self, text: &str, cut: bool) -> TransportResult;
}

/// Byte sink that reaches a printer.
#[async_trait]
pub trait PrinterLink: Send + Sync {
    /// Human-readable endpoint, e.g. `/dev/usb/lp0` or `localhost:9100`.
    fn endpoint(&self) -> String;

    /// Write one complete job. Connectivity is only checked here.
    async fn write(&self, data: &[u8]) -> Result<(), BridgeError>;
}

/// Builds links for protocol handles.
pub trait LinkFactory: Send + Sync {
    fn device(&self, path: &Path) -> Result<Arc<dyn PrinterLink>, BridgeError>;
    fn network(&self, addr: &str) -> Result<Arc<dyn PrinterLink>, BridgeError>;
}

/// Factory for real device and TCP links.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLinks;

impl LinkFactory for SystemLinks {
    fn device(&self, path: &Path) -> Result<Arc<dyn PrinterLink>, BridgeError> {
        Ok(Arc::new(DeviceLink::new(path)))
    }

    fn network(&self, addr: &str) -> Result<Arc<dyn PrinterLink>, BridgeError> {
        Ok(Arc::new(NetworkLink::parse(addr)?))
    }
}
