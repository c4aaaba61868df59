//! USB-ID printing through an external helper.
//!
//! The helper is a single-shot process that reads one JSON object from
//! stdin and writes one JSON object to stdout:
//!
//! ```text
//! stdin:  {"vendor_id": "0x04b8", "product_id": "0x0202", "text": "...", "cut": true}
//! stdout: {"success": true, "message": "Print successful"}
//!     or  {"success": false, "error": "..."}
//! ```

use std::io::ErrorKind;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use super::{Adapter, TransportResult};
use crate::discovery::{DeviceEnumerator, usb};
use crate::error::BridgeError;

/// Helper input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperRequest {
    pub vendor_id: String,
    pub product_id: String,
    pub text: String,
    pub cut: bool,
}

/// Helper output, when it is JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct HelperResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// What the helper process left behind.
#[derive(Debug, Clone, Default)]
pub struct HelperOutput {
    pub exit_ok: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs the USB-ID helper.
#[async_trait]
pub trait UsbIdPrinter: Send + Sync {
    async fn run(&self, request: &HelperRequest) -> Result<HelperOutput, BridgeError>;
}

/// Helper launched as a child process.
#[derive(Debug, Clone)]
pub struct HelperProcess {
    program: String,
    args: Vec<String>,
}

impl HelperProcess {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a command line such as `python3 print_usb.py` on whitespace.
    pub fn from_command_line(line: &str) -> Result<Self, BridgeError> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| BridgeError::InvalidInput("USB helper command is empty".into()))?;
        Ok(Self::new(program, parts.collect()))
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl UsbIdPrinter for HelperProcess {
    async fn run(&self, request: &HelperRequest) -> Result<HelperOutput, BridgeError> {
        let input = serde_json::to_vec(request)
            .map_err(|e| BridgeError::Internal(format!("Failed to encode helper input: {}", e)))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                BridgeError::Transport(not_accessible(&format!(
                    "failed to start {}: {}",
                    self.program, e
                )))
            })?;

        // A helper that exits without reading stdin still leaves its answer on stdout.
        if let Some(mut stdin) = child.stdin.take() {
            let written = match stdin.write_all(&input).await {
                Ok(()) => stdin.shutdown().await,
                Err(e) => Err(e),
            };
            match written {
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!("USB helper closed stdin early");
                }
                other => other?,
            }
        }

        let output = child.wait_with_output().await?;
        Ok(HelperOutput {
            exit_ok: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Turn helper output into a transport result.
///
/// - non-zero exit with no stdout: failure carrying stderr
/// - JSON: success or the helper's error
/// - anything else: failure carrying the raw output
pub fn interpret_output(output: &HelperOutput) -> TransportResult {
    let stdout = output.stdout.trim();

    if !output.exit_ok && stdout.is_empty() {
        let detail = if output.stderr.trim().is_empty() {
            match output.exit_code {
                Some(code) => format!("Process exited with code {}", code),
                None => "Process terminated by signal".to_string(),
            }
        } else {
            output.stderr.trim().to_string()
        };
        return Err(BridgeError::Transport(explain_process_error(&detail)));
    }

    match serde_json::from_str::<HelperResponse>(stdout) {
        Ok(response) if response.success => Ok(response
            .message
            .unwrap_or_else(|| "Printed via USB IDs".to_string())),
        Ok(response) => {
            let message = response
                .error
                .unwrap_or_else(|| "USB helper reported failure".to_string());
            error!(error = %message, "USB helper error");
            Err(BridgeError::Transport(explain_helper_error(&message)))
        }
        Err(_) => {
            let raw = [stdout, output.stderr.trim()]
                .into_iter()
                .find(|s| !s.is_empty())
                .unwrap_or("Unknown error");
            error!(output = %raw, "Failed to parse USB helper output");
            Err(BridgeError::Transport(raw.to_string()))
        }
    }
}

fn is_disconnect(message: &str) -> bool {
    message.contains("No such device") || message.contains("disconnected")
}

fn explain_helper_error(message: &str) -> String {
    if is_disconnect(message) {
        format!(
            "USB device not found. Make sure the printer is connected and the container has \
             USB access. Error: {}",
            message
        )
    } else {
        message.to_string()
    }
}

fn not_accessible(detail: &str) -> String {
    format!(
        "USB device not accessible. Ensure: 1) Printer is connected, 2) Container has USB \
         access (privileged mode), 3) USB devices are mounted. Original error: {}",
        detail
    )
}

fn explain_process_error(message: &str) -> String {
    if is_disconnect(message) {
        not_accessible(message)
    } else {
        message.to_string()
    }
}

/// Adapter 1: print by USB vendor/product ID.
pub struct UsbIdAdapter {
    vendor_id: String,
    product_id: String,
    helper: Arc<dyn UsbIdPrinter>,
    enumerator: Arc<dyn DeviceEnumerator>,
}

impl UsbIdAdapter {
    pub fn new(
        vendor_id: impl Into<String>,
        product_id: impl Into<String>,
        helper: Arc<dyn UsbIdPrinter>,
        enumerator: Arc<dyn DeviceEnumerator>,
    ) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            product_id: product_id.into(),
            helper,
            enumerator,
        }
    }

    /// Log a warning when the pair isn't in the USB listing. Never blocks:
    /// the listing can miss devices that are in fact printable.
    async fn precheck(&self) {
        let listing = self.enumerator.usb_listing().await;
        let records = usb::parse_listing(&listing);
        if usb::find_configured(&records, &self.vendor_id, &self.product_id).is_none() {
            warn!(
                vendor_id = %self.vendor_id,
                product_id = %self.product_id,
                devices = records.len(),
                "USB device not found in lsusb output"
            );
        }
    }
}

#[async_trait]
impl Adapter for UsbIdAdapter {
    fn name(&self) -> &'static str {
        "USB IDs"
    }

    async fn send(&self, text: &str, cut: bool) -> TransportResult {
        self.precheck().await;

        info!(
            vendor_id = %self.vendor_id,
            product_id = %self.product_id,
            "Attempting to print via USB IDs"
        );

        let request = HelperRequest {
            vendor_id: self.vendor_id.clone(),
            product_id: self.product_id.clone(),
            text: text.to_string(),
            cut,
        };

        match self.helper.run(&request).await {
            Ok(output) => interpret_output(&output),
            Err(BridgeError::Transport(message)) => {
                error!(error = %message, "USB ID print error");
                Err(BridgeError::Transport(message))
            }
            Err(e) => {
                error!(error = %e, "USB ID print error");
                Err(BridgeError::Transport(explain_process_error(&e.to_string())))
            }
        }
    }
}
