//! # Receipt Bridge - Thermal Printer HTTP Bridge
//!
//! Receipt Bridge accepts print requests over a local JSON API and forwards
//! them to an ESC/POS receipt printer through whichever path works:
//!
//! - **USB IDs**: an external helper addressed by vendor/product ID
//! - **Device path**: a USB printer-class or serial device node
//! - **Spooler**: the host's `lp` print queue
//! - **TCP**: a raw port-9100 network printer as last resort
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use receipt_bridge::{
//!     discovery::SystemEnumerator,
//!     printer::{Backends, PrintService, PrinterState},
//!     receipt::ReceiptContent,
//!     transport::{HelperProcess, LpSpooler, SystemLinks},
//! };
//!
//! # async fn example() -> Result<(), receipt_bridge::BridgeError> {
//! let state = PrinterState::new(Arc::new(SystemLinks), "tcp://192.168.1.50:9100")
//!     .with_usb_ids(Some("0x04b8".into()), Some("0x0202".into()));
//! let service = PrintService::new(
//!     Arc::new(state),
//!     Backends {
//!         enumerator: Arc::new(SystemEnumerator::default()),
//!         spooler: Arc::new(LpSpooler),
//!         usb_helper: Arc::new(HelperProcess::from_command_line("python3 print_usb.py")?),
//!     },
//! );
//!
//! service.print_plain("Hello", None).await?;
//!
//! let receipt = ReceiptContent::new(
//!     Some("Order 42".into()),
//!     None,
//!     vec!["1x Coffee".into(), "1x Bagel".into()],
//! );
//! service.print_formatted(&receipt).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | ESC/POS command builders and PC852 encoding |
//! | [`receipt`] | Plain and rich receipt layout |
//! | [`discovery`] | Device node scan, `lsusb` parsing, diagnostics |
//! | [`transport`] | Adapters and byte links |
//! | [`printer`] | Configuration state and fallback orchestration |
//! | [`server`] | axum HTTP API |
//! | [`logging`] | tracing subscriber setup |
//! | [`error`] | Error types |

pub mod discovery;
pub mod error;
pub mod logging;
pub mod printer;
pub mod protocol;
pub mod receipt;
pub mod server;
pub mod transport;

// Re-exports for convenience
pub use error::{BridgeError, Result};
pub use printer::{PrintService, PrinterState};
pub use receipt::ReceiptContent;
