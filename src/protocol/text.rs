//! # ESC/POS Text Styling Commands
//!
//! | Style | Command | Effect |
//! |-------|---------|--------|
//! | Alignment | ESC a n | Left / center / right |
//! | Bold | ESC E n | Emphasized text |
//! | Size | GS ! n | 1–8× width and height |

use super::commands::{ESC, GS};

// ============================================================================
// TEXT ALIGNMENT
// ============================================================================

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// # Set Text Alignment (ESC a n)
///
/// Takes effect at the start of the next line.
///
/// ## Example
///
/// ```
/// use receipt_bridge::protocol::text::{align, Alignment};
///
/// assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
/// ```
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

// ============================================================================
// EMPHASIS
// ============================================================================

/// Bold off (ESC E 0)
#[inline]
pub fn bold_off() -> Vec<u8> {
    vec![ESC, b'E', 0]
}

// ============================================================================
// CHARACTER SIZE
// ============================================================================

/// # Select Character Size (GS ! n)
///
/// Multipliers are clamped to 1..=8. The width multiplier goes in the high
/// nibble, the height multiplier in the low nibble, both zero-based.
///
/// ## Example
///
/// ```
/// use receipt_bridge::protocol::text::size;
///
/// // Double width and height
/// assert_eq!(size(2, 2), vec![0x1D, 0x21, 0x11]);
/// ```
pub fn size(height_mult: u8, width_mult: u8) -> Vec<u8> {
    let h = height_mult.clamp(1, 8) - 1;
    let w = width_mult.clamp(1, 8) - 1;
    vec![GS, b'!', (w << 4) | h]
}

/// Normal 1×1 character size
#[inline]
pub fn size_normal() -> Vec<u8> {
    size(1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment() {
        assert_eq!(align(Alignment::Left), vec![0x1B, 0x61, 0x00]);
        assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
        assert_eq!(align(Alignment::Right), vec![0x1B, 0x61, 0x02]);
    }

    #[test]
    fn test_bold_off() {
        assert_eq!(bold_off(), vec![0x1B, 0x45, 0x00]);
    }

    #[test]
    fn test_size_nibbles() {
        assert_eq!(size_normal(), vec![0x1D, 0x21, 0x00]);
        assert_eq!(size(2, 1), vec![0x1D, 0x21, 0x01]);
        assert_eq!(size(1, 2), vec![0x1D, 0x21, 0x10]);
        assert_eq!(size(8, 8), vec![0x1D, 0x21, 0x77]);
    }

    #[test]
    fn test_size_clamps() {
        assert_eq!(size(0, 0), size_normal());
        assert_eq!(size(20, 20), size(8, 8));
    }
}
