//! # Line Buffer
//!
//! [`EscPosBuilder`] accumulates a job as a sequence of line-oriented calls
//! (clear, align, print line, rule, cut) and hands the finished bytes to a
//! [`PrinterLink`](crate::transport::PrinterLink) in one write.

use super::{commands, pc852, text};

/// Columns per line for Font A on 80mm paper.
pub const DEFAULT_COLUMNS: usize = 48;

/// Character used by [`EscPosBuilder::draw_line`].
pub const LINE_CHARACTER: char = '-';

/// ESC/POS job under construction.
///
/// ## Example
///
/// ```
/// use receipt_bridge::protocol::EscPosBuilder;
///
/// let mut job = EscPosBuilder::new(32);
/// job.align_center().println("HELLO").draw_line().cut();
/// assert!(!job.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct EscPosBuilder {
    buf: Vec<u8>,
    columns: usize,
}

impl EscPosBuilder {
    pub fn new(columns: usize) -> Self {
        let mut builder = Self {
            buf: Vec::new(),
            columns,
        };
        builder.clear();
        builder
    }

    /// Drop everything queued so far and start over with a fresh header.
    pub fn clear(&mut self) -> &mut Self {
        self.buf.clear();
        self.buf.extend(commands::init());
        self.buf
            .extend(commands::code_table(commands::CODE_TABLE_PC852));
        self
    }

    pub fn align_left(&mut self) -> &mut Self {
        self.buf.extend(text::align(text::Alignment::Left));
        self
    }

    pub fn align_center(&mut self) -> &mut Self {
        self.buf.extend(text::align(text::Alignment::Center));
        self
    }

    pub fn set_text_size(&mut self, height: u8, width: u8) -> &mut Self {
        self.buf.extend(text::size(height, width));
        self
    }

    /// Back to 1×1, bold off.
    pub fn set_text_normal(&mut self) -> &mut Self {
        self.buf.extend(text::size_normal());
        self.buf.extend(text::bold_off());
        self
    }

    /// Print `line` followed by a line feed. Embedded newlines print as
    /// separate lines; `\r` is dropped.
    pub fn println(&mut self, line: &str) -> &mut Self {
        for part in line.split('\n') {
            self.buf.extend(pc852::encode(part.trim_end_matches('\r')));
            self.buf.push(commands::LF);
        }
        self
    }

    /// Full-width horizontal rule.
    pub fn draw_line(&mut self) -> &mut Self {
        let rule: String = std::iter::repeat_n(LINE_CHARACTER, self.columns).collect();
        self.println(&rule)
    }

    pub fn cut(&mut self) -> &mut Self {
        self.buf.extend(commands::cut_full_feed());
        self
    }

    /// True when nothing beyond the job header has been queued.
    pub fn is_empty(&self) -> bool {
        self.buf.len() <= header_len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS)
    }
}

fn header_len() -> usize {
    commands::init().len() + commands::code_table(commands::CODE_TABLE_PC852).len()
}
