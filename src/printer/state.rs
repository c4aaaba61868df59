//! Process-wide printer configuration.
//!
//! Settings sit behind a `tokio::sync::RwLock`. The lock is only held while
//! settings are read or swapped, never across a print, so concurrent
//! requests can observe a configuration change mid-flight.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{BridgeError, Result};
use crate::transport::{HandleKind, LinkFactory, ProtocolHandle};

/// Snapshot of the mutable printer settings.
#[derive(Debug, Clone, Default)]
pub struct PrinterSettings {
    pub device_path: Option<String>,
    pub usb_vendor_id: Option<String>,
    pub usb_product_id: Option<String>,
    pub handle: Option<Arc<ProtocolHandle>>,
}

impl PrinterSettings {
    /// Both IDs, when both are set.
    pub fn usb_ids(&self) -> Option<(String, String)> {
        match (&self.usb_vendor_id, &self.usb_product_id) {
            (Some(v), Some(p)) => Some((v.clone(), p.clone())),
            _ => None,
        }
    }

    /// The current handle if it was built from a device path.
    pub fn device_handle(&self) -> Option<Arc<ProtocolHandle>> {
        self.handle
            .as_ref()
            .filter(|h| h.device_path().is_some())
            .cloned()
    }
}

/// Shared printer configuration.
pub struct PrinterState {
    settings: RwLock<PrinterSettings>,
    links: Arc<dyn LinkFactory>,
    tcp_fallback: String,
}

impl PrinterState {
    pub fn new(links: Arc<dyn LinkFactory>, tcp_fallback: impl Into<String>) -> Self {
        Self {
            settings: RwLock::new(PrinterSettings::default()),
            links,
            tcp_fallback: tcp_fallback.into(),
        }
    }

    /// Seed the USB IDs from startup configuration. Either may be absent.
    pub fn with_usb_ids(self, vendor_id: Option<String>, product_id: Option<String>) -> Self {
        let clean = |id: Option<String>| id.filter(|s| !s.trim().is_empty());
        let mut settings = self.settings.into_inner();
        settings.usb_vendor_id = clean(vendor_id);
        settings.usb_product_id = clean(product_id);
        Self {
            settings: RwLock::new(settings),
            ..self
        }
    }

    /// Build the TCP fallback handle at startup.
    ///
    /// Only the address is validated; whether anything listens there is
    /// discovered on first use.
    pub async fn initialize(&self) -> bool {
        let ready = self.ensure_handle().await.is_some();
        if ready {
            info!(addr = %self.tcp_fallback, "Thermal printer initialized");
        }
        ready
    }

    pub async fn snapshot(&self) -> PrinterSettings {
        self.settings.read().await.clone()
    }

    /// Point the protocol handle at a device node.
    ///
    /// On any failure the previous configuration is left untouched.
    pub async fn set_device_path(&self, path: &str) -> Result<()> {
        if path.trim().is_empty() {
            return Err(BridgeError::InvalidInput("Device path is required".into()));
        }
        if !Path::new(path).exists() {
            return Err(BridgeError::InvalidInput(format!(
                "Device path does not exist: {}",
                path
            )));
        }

        let link = self.links.device(Path::new(path)).map_err(|e| {
            warn!(device = %path, error = %e, "Failed to initialize printer");
            BridgeError::Internal("Failed to initialize printer with the specified device".into())
        })?;
        let handle = Arc::new(ProtocolHandle::new(HandleKind::Device(path.to_string()), link));

        let mut settings = self.settings.write().await;
        settings.handle = Some(handle);
        settings.device_path = Some(path.to_string());
        info!(device = %path, "USB device set");
        Ok(())
    }

    /// Store the USB vendor/product pair verbatim.
    pub async fn set_usb_ids(&self, vendor_id: &str, product_id: &str) -> Result<()> {
        if vendor_id.trim().is_empty() || product_id.trim().is_empty() {
            return Err(BridgeError::InvalidInput(
                "Both vendor_id and product_id are required".into(),
            ));
        }

        let mut settings = self.settings.write().await;
        settings.usb_vendor_id = Some(vendor_id.to_string());
        settings.usb_product_id = Some(product_id.to_string());
        info!(vendor_id, product_id, "USB IDs set");
        Ok(())
    }

    /// Current handle, building the TCP fallback one if none exists.
    pub async fn ensure_handle(&self) -> Option<Arc<ProtocolHandle>> {
        if let Some(handle) = self.settings.read().await.handle.clone() {
            return Some(handle);
        }

        let link = match self.links.network(&self.tcp_fallback) {
            Ok(link) => link,
            Err(e) => {
                warn!(addr = %self.tcp_fallback, error = %e, "Failed to initialize thermal printer");
                return None;
            }
        };

        let mut settings = self.settings.write().await;
        let handle = settings
            .handle
            .get_or_insert_with(|| {
                Arc::new(ProtocolHandle::new(
                    HandleKind::Tcp(self.tcp_fallback.clone()),
                    link,
                ))
            })
            .clone();
        Some(handle)
    }
}
