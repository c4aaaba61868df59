//! # ESC/POS Control Commands
//!
//! Command builders for the Epson ESC/POS protocol spoken by TM-series
//! receipt printers (TM-T88, TM-T20, TM-T900F, ...).
//!
//! ## Escape Sequence Structure
//!
//! Commands follow these patterns:
//! - Single byte: `LF`
//! - Two bytes: `ESC @`
//! - Multi-byte with parameters: `ESC d n`, `GS V m`, `ESC t n`
//!
//! ## Reference
//!
//! Based on the "ESC/POS Application Programming Guide" by Seiko Epson Corp.

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte (0x1B)
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix (0x1D)
///
/// Used for cutter control and character size selection.
pub const GS: u8 = 0x1D;

/// LF (Line Feed) - Print the line buffer and advance one line
pub const LF: u8 = 0x0A;

/// Code table number for PC852 (Latin-2) on Epson printers.
pub const CODE_TABLE_PC852: u8 = 18;

// ============================================================================
// INITIALIZATION COMMANDS
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Clears the print buffer and resets text formatting, alignment and
/// character size to their power-on defaults. Sent at the start of every job.
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
///
/// ## Example
///
/// ```
/// use receipt_bridge::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Select Character Code Table (ESC t n)
///
/// Selects which single-byte table bytes 0x80–0xFF are printed from.
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC t n  |
/// | Hex     | 1B 74 n  |
#[inline]
pub fn code_table(n: u8) -> Vec<u8> {
    vec![ESC, b't', n]
}

// ============================================================================
// PAPER FEED COMMANDS
// ============================================================================

/// # Print and Feed n Lines (ESC d n)
///
/// Prints the line buffer and feeds `n` lines. Used to move the last printed
/// line past the cutter blade before cutting.
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![ESC, b'd', n]
}

// ============================================================================
// CUTTER CONTROL COMMANDS
// ============================================================================

/// # Full Cut (GS V 0)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | GS V 0   |
/// | Hex     | 1D 56 00 |
#[inline]
pub fn cut_full() -> Vec<u8> {
    vec![GS, b'V', 0]
}

/// Feed enough paper to clear the cutter, then full cut.
///
/// ## Example
///
/// ```
/// use receipt_bridge::protocol::commands;
///
/// assert_eq!(
///     commands::cut_full_feed(),
///     vec![0x1B, 0x64, 0x04, 0x1D, 0x56, 0x00]
/// );
/// ```
pub fn cut_full_feed() -> Vec<u8> {
    let mut out = feed_lines(CUT_FEED_LINES);
    out.extend(cut_full());
    out
}

/// Lines fed before cutting so the last row clears the blade.
const CUT_FEED_LINES: u8 = 4;

// ============================================================================
// TESTS
// ============================================================================
