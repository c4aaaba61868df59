//! Host print spooler (`lp` / `lpstat`).
//!
//! Text is written to a temporary file and submitted with `lp`. The
//! destination is picked in this order:
//!
//! 1. An explicitly requested printer name
//! 2. The first queue whose name looks like an Epson / TM-T900
//! 3. The system default destination
//! 4. The first queue listed
//!
//! With no destination at all, `lp` is called without `-d`.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tracing::{debug, error, info};

use super::{Adapter, TransportResult};
use crate::error::BridgeError;

static DEFAULT_DESTINATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"system default destination: (\S+)").expect("valid default destination regex")
});

/// Substrings that mark a queue as the receipt printer.
const PREFERRED_MARKERS: &[&str] = &["epson", "t900", "tm-t900"];

/// Shown in the status listing when `lpstat` produces nothing.
pub const NO_PRINTERS: &str = "No printers found";

/// Access to the host spooler.
#[async_trait]
pub trait SpoolerClient: Send + Sync {
    /// Queue names accepting jobs. Empty when `lpstat` fails.
    async fn printers(&self) -> Vec<String>;

    /// System default destination, if any.
    async fn default_destination(&self) -> Option<String>;

    /// Printer status listing, one entry per line.
    async fn status_lines(&self) -> Vec<String>;

    /// Submit a file, optionally to a named destination.
    async fn submit(&self, destination: Option<&str>, file: &Path) -> Result<(), BridgeError>;
}

/// Spooler driven through the CUPS command-line tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct LpSpooler;

async fn lpstat(args: &[&str]) -> Option<String> {
    match Command::new("lpstat").args(args).output().await {
        Ok(output) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(output) => {
            debug!(?args, status = %output.status, "lpstat exited unsuccessfully");
            None
        }
        Err(e) => {
            debug!(?args, error = %e, "lpstat not available");
            None
        }
    }
}

#[async_trait]
impl SpoolerClient for LpSpooler {
    async fn printers(&self) -> Vec<String> {
        lpstat(&["-a"])
            .await
            .map(|out| parse_printer_names(&out))
            .unwrap_or_default()
    }

    async fn default_destination(&self) -> Option<String> {
        lpstat(&["-d"])
            .await
            .and_then(|out| parse_default_destination(&out))
    }

    async fn status_lines(&self) -> Vec<String> {
        let lines: Vec<String> = lpstat(&["-p", "-d"])
            .await
            .map(|out| non_empty_lines(&out))
            .unwrap_or_default();
        if lines.is_empty() {
            vec![NO_PRINTERS.to_string()]
        } else {
            lines
        }
    }

    async fn submit(&self, destination: Option<&str>, file: &Path) -> Result<(), BridgeError> {
        let mut cmd = Command::new("lp");
        if let Some(name) = destination {
            cmd.arg("-d").arg(name);
        }
        cmd.arg(file);

        let output = cmd
            .output()
            .await
            .map_err(|e| BridgeError::Transport(format!("Failed to run lp: {}", e)))?;

        if output.status.success() {
            debug!(stdout = %String::from_utf8_lossy(&output.stdout).trim(), "lp accepted job");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(BridgeError::Transport(if stderr.is_empty() {
                format!("lp exited with {}", output.status)
            } else {
                stderr
            }))
        }
    }
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// First whitespace-delimited token of each non-empty line.
pub fn parse_printer_names(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

pub fn parse_default_destination(output: &str) -> Option<String> {
    DEFAULT_DESTINATION
        .captures(output)
        .map(|caps| caps[1].to_string())
}

fn preferred_queue(printers: &[String]) -> Option<&String> {
    printers.iter().find(|name| {
        let lower = name.to_lowercase();
        PREFERRED_MARKERS.iter().any(|m| lower.contains(m))
    })
}

/// Choose a destination queue. `None` means "let `lp` decide".
pub fn select_destination(
    requested: Option<&str>,
    printers: &[String],
    default: Option<&str>,
) -> Option<String> {
    if let Some(name) = requested.filter(|n| !n.trim().is_empty()) {
        return Some(name.to_string());
    }

    preferred_queue(printers)
        .cloned()
        .or_else(|| default.map(str::to_string))
        .or_else(|| printers.first().cloned())
}

/// Adapter 3: the host spooler.
pub struct SpoolerAdapter {
    client: Arc<dyn SpoolerClient>,
    requested: Option<String>,
}

impl SpoolerAdapter {
    pub fn new(client: Arc<dyn SpoolerClient>) -> Self {
        Self {
            client,
            requested: None,
        }
    }

    /// Prefer a named queue over the automatic choice.
    pub fn with_destination(mut self, name: Option<String>) -> Self {
        self.requested = name;
        self
    }

    async fn destination(&self) -> Option<String> {
        if let Some(name) = self.requested.as_deref().filter(|n| !n.trim().is_empty()) {
            return Some(name.to_string());
        }

        let printers = self.client.printers().await;
        if let Some(name) = preferred_queue(&printers) {
            return Some(name.clone());
        }

        let default = self.client.default_destination().await;
        select_destination(None, &printers, default.as_deref())
    }
}

#[async_trait]
impl Adapter for SpoolerAdapter {
    fn name(&self) -> &'static str {
        "System printer"
    }

    async fn send(&self, text: &str, _cut: bool) -> TransportResult {
        let file = tempfile::Builder::new()
            .prefix("print_")
            .suffix(".txt")
            .tempfile()?;
        tokio::fs::write(file.path(), text.as_bytes()).await?;

        let destination = self.destination().await;
        info!(destination = ?destination, "Submitting job to system spooler");

        let submitted = self.client.submit(destination.as_deref(), file.path()).await;

        if let Err(e) = file.close() {
            debug!(error = %e, "Failed to remove spool file");
        }

        match submitted {
            Ok(()) => Ok(match destination {
                Some(name) => format!("Printed to {}", name),
                None => "Printed to default printer".to_string(),
            }),
            Err(e) => {
                error!(error = %e, "System printer error");
                Err(e)
            }
        }
    }
}
