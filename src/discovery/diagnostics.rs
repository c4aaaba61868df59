//! USB accessibility diagnostics.
//!
//! Assembles a fixed-shape report of tool availability, bus mount state and
//! whether the configured vendor/product pair is currently visible, then
//! derives remediation hints from whichever checks failed.

use serde::Serialize;

use super::usb::{self, UsbDeviceRecord};
use super::{BusState, DeviceEnumerator};

/// Vendor/product pair as configured, verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfiguredIds {
    pub vendor_id: Option<String>,
    pub product_id: Option<String>,
}

impl ConfiguredIds {
    pub fn pair(&self) -> Option<(&str, &str)> {
        match (&self.vendor_id, &self.product_id) {
            (Some(v), Some(p)) => Some((v.as_str(), p.as_str())),
            _ => None,
        }
    }
}

/// Accessibility report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UsbDiagnostics {
    pub lsusb_available: bool,
    pub lsusb_output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lsusb_error: Option<String>,
    pub usb_devices: Vec<UsbDeviceRecord>,
    pub configured_ids: ConfiguredIds,
    pub device_found: bool,
    pub usb_bus_accessible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usb_bus_dirs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usb_bus_read_error: Option<String>,
}

/// Run every check and build the report.
pub async fn check_usb_accessibility(
    enumerator: &dyn DeviceEnumerator,
    configured: ConfiguredIds,
) -> UsbDiagnostics {
    let mut report = UsbDiagnostics {
        configured_ids: configured,
        ..Default::default()
    };

    if enumerator.usb_tool_available().await {
        report.lsusb_available = true;
        match enumerator.try_usb_listing().await {
            Ok(listing) => report.lsusb_output = listing,
            Err(error) => report.lsusb_error = Some(error),
        }
        report.usb_devices = usb::parse_listing(&report.lsusb_output);

        if let Some((vendor, product)) = report.configured_ids.pair() {
            report.device_found =
                usb::find_configured(&report.usb_devices, vendor, product).is_some();
        }
    }

    match enumerator.usb_bus().await {
        BusState::Missing => {}
        BusState::Listed(dirs) => {
            report.usb_bus_accessible = true;
            report.usb_bus_dirs = Some(dirs);
        }
        BusState::Unreadable(error) => {
            report.usb_bus_accessible = true;
            report.usb_bus_read_error = Some(error);
        }
    }

    report
}

/// Remediation hints for whichever checks failed.
pub fn recommendations(report: &UsbDiagnostics) -> Vec<String> {
    let mut hints = Vec::new();

    if !report.lsusb_available {
        hints.push("lsusb command not available. Install usbutils package.".to_string());
    }

    if !report.usb_bus_accessible {
        hints.push(
            "/dev/bus/usb is not accessible. Ensure privileged mode and USB device mounting \
             in docker-compose.yml"
                .to_string(),
        );
    }

    match report.configured_ids.pair() {
        Some((vendor, product)) if !report.device_found => hints.push(format!(
            "Configured USB device ({}:{}) not found. Check: 1) Printer is connected, \
             2) Container has USB access, 3) Device IDs are correct",
            vendor, product
        )),
        Some(_) => {}
        None => hints.push(
            "USB vendor/product IDs not configured. Use /api/printer/set-usb-ids to set them."
                .to_string(),
        ),
    }

    if report.lsusb_available && report.usb_devices.is_empty() {
        hints.push(
            "No USB devices detected. Ensure printer is connected and container has USB access."
                .to_string(),
        );
    }

    hints
}
