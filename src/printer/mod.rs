//! # Printer Orchestration
//!
//! ## Modules
//!
//! - [`state`]: Mutable configuration (device path, USB IDs, protocol handle)
//! - [`fallback`]: Ordered adapter chain with error aggregation
//! - [`service`]: Plain, receipt and self-test printing on top of both

pub mod fallback;
pub mod service;
pub mod state;

pub use fallback::{Exhausted, FallbackChain, REMEDIATION_HINT};
pub use service::{Backends, PrintService};
pub use state::{PrinterSettings, PrinterState};
