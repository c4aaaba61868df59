//! # ESC/POS Protocol Implementation
//!
//! Low-level command builders for the line-oriented control protocol spoken
//! by Epson-compatible thermal receipt printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Initialization, code table, feed and cut
//! - [`text`]: Alignment, emphasis and character size
//! - [`pc852`]: Latin-2 text encoding
//! - [`builder`]: [`EscPosBuilder`], the clear/align/print/cut line buffer
//!
//! ## Usage Example
//!
//! ```
//! use receipt_bridge::protocol::EscPosBuilder;
//!
//! let mut job = EscPosBuilder::default();
//! job.clear();
//! job.align_left();
//! job.println("Hello from the bridge");
//! job.cut();
//!
//! let bytes = job.build();
//! // Send `bytes` to a PrinterLink...
//! # assert!(!bytes.is_empty());
//! ```

pub mod builder;
pub mod commands;
pub mod pc852;
pub mod text;

pub use builder::EscPosBuilder;
