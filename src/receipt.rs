//! # Receipt Formatting
//!
//! Turns a (title, body, line items) triple into either:
//!
//! - a single plain-text blob, for transports that can only carry text
//!   (USB-ID helper, system spooler), via [`compose_text`]
//! - a sequence of line-oriented protocol calls on an [`EscPosBuilder`],
//!   via [`render`]
//!
//! ## Plain Layout
//!
//! ```text
//!
//! TITLE
//! ================================
//! body
//! item 1
//! item 2
//!
//! ```

use chrono::Local;

use crate::protocol::EscPosBuilder;

/// Width of the `=` rule under the title in plain layout.
pub const RULE_WIDTH: usize = 32;

/// Content of a receipt-style print request. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiptContent {
    pub title: Option<String>,
    pub body: Option<String>,
    pub items: Vec<String>,
}

impl ReceiptContent {
    pub fn new(title: Option<String>, body: Option<String>, items: Vec<String>) -> Self {
        Self {
            title: title.filter(|t| !t.is_empty()),
            body: body.filter(|b| !b.is_empty()),
            items,
        }
    }

    /// True when there is nothing to print at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.items.is_empty()
    }
}

/// The `=` rule printed under titles.
pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Compose the plain-text form of a receipt.
///
/// ## Example
///
/// ```
/// use receipt_bridge::receipt::{compose_text, ReceiptContent};
///
/// let receipt = ReceiptContent::new(Some("A".into()), Some("B".into()), vec!["1".into()]);
/// let text = compose_text(&receipt);
/// assert!(text.starts_with("\nA\n===="));
/// assert!(text.ends_with("B\n1\n\n"));
/// ```
pub fn compose_text(receipt: &ReceiptContent) -> String {
    let mut out = String::new();
    if let Some(title) = &receipt.title {
        out.push('\n');
        out.push_str(title);
        out.push('\n');
        out.push_str(&rule());
        out.push('\n');
    }
    if let Some(body) = &receipt.body {
        out.push_str(body);
        out.push('\n');
    }
    for item in &receipt.items {
        out.push_str(item);
        out.push('\n');
    }
    out.push('\n');
    out
}

/// Queue the rich form of a receipt: centered double-size title and rule,
/// left-aligned body and items, closing rule and cut.
pub fn render(job: &mut EscPosBuilder, receipt: &ReceiptContent) {
    job.clear();
    if let Some(title) = &receipt.title {
        job.align_center();
        job.set_text_size(2, 2);
        job.println(title);
        job.set_text_normal();
        job.draw_line();
    }

    job.align_left();
    job.set_text_normal();
    if let Some(body) = &receipt.body {
        job.println(body);
    }
    for item in &receipt.items {
        job.println(item);
    }

    job.draw_line();
    job.cut();
}

/// Fixed self-test payload, stamped with `printed_at`.
pub fn self_test_text(printed_at: &str) -> String {
    let rule = rule();
    format!(
        "\n{rule}\n    RECEIPT PRINTER TEST\n{rule}\n\n\
         This is a test print from the\n\
         receipt bridge.\n\n\
         Date: {printed_at}\n\n\
         If you can read this, the printer\n\
         is working correctly!\n\n\
         {rule}\n"
    )
}

/// Current local date and time for receipt stamps.
pub fn current_datetime() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
