//! # Device Discovery
//!
//! Enumerates candidate printer endpoints and reports whether the configured
//! USB printer is reachable.
//!
//! ## Modules
//!
//! - [`serial`]: Character-device candidates under `/dev`
//! - [`usb`]: `lsusb` output parsing into [`UsbDeviceRecord`]s
//! - [`diagnostics`]: Accessibility report and remediation hints
//!
//! All OS access goes through the [`DeviceEnumerator`] trait so the rest of
//! the crate can be exercised without hardware. [`SystemEnumerator`] is the
//! real implementation. None of its methods fail: a missing tool or
//! directory is reported as "nothing found".

pub mod diagnostics;
pub mod serial;
pub mod usb;

pub use diagnostics::{UsbDiagnostics, check_usb_accessibility, recommendations};
pub use usb::UsbDeviceRecord;

use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Default device directory.
pub const DEV_DIR: &str = "/dev";

/// Mount point of the USB bus device tree on Linux.
pub const USB_BUS_PATH: &str = "/dev/bus/usb";

/// Enumeration tool binary.
pub const LSUSB: &str = "lsusb";

/// State of the USB bus mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusState {
    /// Mount path does not exist
    Missing,
    /// Mount path exists; sorted subdirectory names
    Listed(Vec<String>),
    /// Mount path exists but could not be read
    Unreadable(String),
}

/// OS-level enumeration of printer endpoints.
#[async_trait]
pub trait DeviceEnumerator: Send + Sync {
    /// Candidate character-device paths.
    async fn serial_candidates(&self) -> Vec<String>;

    /// Whether the USB enumeration tool is installed.
    async fn usb_tool_available(&self) -> bool;

    /// Raw enumeration output, or why the tool could not produce it.
    async fn try_usb_listing(&self) -> Result<String, String>;

    /// Raw enumeration output. Empty when the tool is missing or fails.
    async fn usb_listing(&self) -> String {
        self.try_usb_listing().await.unwrap_or_default()
    }

    /// State of the USB bus mount.
    async fn usb_bus(&self) -> BusState;

    /// Parsed USB device records.
    async fn usb_devices(&self) -> Vec<UsbDeviceRecord> {
        usb::parse_listing(&self.usb_listing().await)
    }
}

/// Enumerator backed by the real filesystem and `lsusb`.
#[derive(Debug, Clone)]
pub struct SystemEnumerator {
    dev_dir: PathBuf,
    usb_bus_path: PathBuf,
}

impl SystemEnumerator {
    pub fn new(dev_dir: impl Into<PathBuf>, usb_bus_path: impl Into<PathBuf>) -> Self {
        Self {
            dev_dir: dev_dir.into(),
            usb_bus_path: usb_bus_path.into(),
        }
    }
}

impl Default for SystemEnumerator {
    fn default() -> Self {
        Self::new(DEV_DIR, USB_BUS_PATH)
    }
}

#[async_trait]
impl DeviceEnumerator for SystemEnumerator {
    async fn serial_candidates(&self) -> Vec<String> {
        let dev_dir = self.dev_dir.clone();
        let found = tokio::task::spawn_blocking(move || serial::scan(&dev_dir))
            .await
            .unwrap_or_default();

        #[cfg(target_os = "macos")]
        log_ioreg_printers().await;

        debug!(count = found.len(), "Serial candidates scanned");
        found
    }

    async fn usb_tool_available(&self) -> bool {
        match Command::new("which").arg(LSUSB).output().await {
            Ok(output) => {
                output.status.success() && !String::from_utf8_lossy(&output.stdout).trim().is_empty()
            }
            Err(_) => false,
        }
    }

    async fn try_usb_listing(&self) -> Result<String, String> {
        match Command::new(LSUSB).output().await {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => {
                debug!(status = %output.status, "lsusb exited unsuccessfully");
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                Err(if stderr.is_empty() {
                    format!("lsusb exited with {}", output.status)
                } else {
                    stderr
                })
            }
            Err(e) => {
                debug!(error = %e, "lsusb not available");
                Err(e.to_string())
            }
        }
    }

    async fn usb_bus(&self) -> BusState {
        if !self.usb_bus_path.exists() {
            return BusState::Missing;
        }
        match fs::read_dir(&self.usb_bus_path) {
            Ok(entries) => {
                let mut dirs: Vec<String> = entries
                    .filter_map(|e| e.ok())
                    .filter_map(|e| e.file_name().into_string().ok())
                    .collect();
                dirs.sort();
                BusState::Listed(dirs)
            }
            Err(e) => BusState::Unreadable(e.to_string()),
        }
    }
}

/// Log any Epson entry in the macOS USB registry.
#[cfg(target_os = "macos")]
async fn log_ioreg_printers() {
    let Ok(output) = Command::new("ioreg")
        .args(["-p", "IOUSB", "-l", "-w", "0"])
        .output()
        .await
    else {
        return;
    };

    let listing = String::from_utf8_lossy(&output.stdout);
    if let Some(line) = listing.lines().find(|line| {
        let lower = line.to_lowercase();
        lower.contains("epson") || lower.contains("tm-t900")
    }) {
        tracing::info!(entry = line.trim(), "Found potential Epson device in ioreg");
    }
}
