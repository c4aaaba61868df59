//! Discovery and configuration handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::discovery::recommendations;
use crate::error::BridgeError;

use super::super::extract::ApiJson;
use super::super::response::ApiResult;
use super::super::state::AppState;

const NOTHING_DETECTED: &str = "No printers or USB devices detected. Make sure your printer is \
     connected via USB. You can also configure USB vendor/product IDs via /api/printer/set-usb-ids";

/// GET /api/printer/status - spooler queues, device nodes and configuration.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<Value> {
    let backends = state.service.backends();
    let printers = backends.spooler.status_lines().await;
    let devices = backends.enumerator.serial_candidates().await;
    let settings = state.service.state().snapshot().await;

    let found = !printers.is_empty() || !devices.is_empty() || settings.usb_ids().is_some();
    let message = if found {
        "Printers/devices found"
    } else {
        NOTHING_DETECTED
    };

    Json(json!({
        "success": true,
        "systemPrinters": printers,
        "usbDevices": devices,
        "currentUsbDevice": settings.device_path,
        "usbVendorId": settings.usb_vendor_id,
        "usbProductId": settings.usb_product_id,
        "message": message,
    }))
}

/// GET /api/printer/scan-usb - candidate device paths.
pub async fn scan_usb(State(state): State<Arc<AppState>>) -> Json<Value> {
    let devices = state.service.backends().enumerator.serial_candidates().await;
    Json(json!({
        "success": true,
        "message": format!("Found {} USB device(s)", devices.len()),
        "devices": devices,
    }))
}

/// GET /api/printer/scan-usb-lsusb - USB devices with vendor/product IDs.
pub async fn scan_usb_lsusb(State(state): State<Arc<AppState>>) -> Json<Value> {
    let devices = state.service.backends().enumerator.usb_devices().await;
    Json(json!({
        "success": true,
        "message": format!("Found {} USB device(s)", devices.len()),
        "devices": devices,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDeviceRequest {
    #[serde(default)]
    pub device_path: Option<String>,
}

/// POST /api/printer/set-usb-device
pub async fn set_usb_device(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SetDeviceRequest>,
) -> ApiResult<Json<Value>> {
    let path = req.device_path.unwrap_or_default();
    state.service.state().set_device_path(&path).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("USB device set to: {}", path),
        "devicePath": path,
    })))
}

/// IDs arrive as `"0x04b8"`, `"1208"` or `1208`.
#[derive(Debug, Deserialize)]
pub struct SetUsbIdsRequest {
    #[serde(default)]
    pub vendor_id: Value,
    #[serde(default)]
    pub product_id: Value,
}

/// Textual form of an ID; `None` for anything empty or falsy.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// POST /api/printer/set-usb-ids
pub async fn set_usb_ids(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SetUsbIdsRequest>,
) -> ApiResult<Json<Value>> {
    let (Some(vendor), Some(product)) = (id_text(&req.vendor_id), id_text(&req.product_id)) else {
        return Err(BridgeError::InvalidInput(
            "Both vendor_id and product_id are required".into(),
        ));
    };

    state.service.state().set_usb_ids(&vendor, &product).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("USB IDs set: Vendor={}, Product={}", vendor, product),
        "vendor_id": vendor,
        "product_id": product,
    })))
}

/// GET /api/printer/usb-ids
pub async fn usb_ids(State(state): State<Arc<AppState>>) -> Json<Value> {
    let settings = state.service.state().snapshot().await;
    Json(json!({
        "success": true,
        "configured": settings.usb_ids().is_some(),
        "vendor_id": settings.usb_vendor_id,
        "product_id": settings.usb_product_id,
    }))
}

/// GET /api/printer/check-usb-access
pub async fn check_usb_access(State(state): State<Arc<AppState>>) -> Json<Value> {
    let report = state.service.diagnostics().await;
    let hints = recommendations(&report);
    Json(json!({
        "success": true,
        "diagnostics": report,
        "recommendations": hints,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_text_accepts_strings_and_numbers() {
        assert_eq!(id_text(&json!("0x04b8")), Some("0x04b8".to_string()));
        assert_eq!(id_text(&json!(1208)), Some("1208".to_string()));
        assert_eq!(id_text(&json!("")), None);
        assert_eq!(id_text(&json!(0)), None);
        assert_eq!(id_text(&Value::Null), None);
    }
}
