//! # Code Page 852 Encoding
//!
//! Converts Unicode strings to PC852 (Latin-2) single-byte encoding.
//!
//! The printer must be switched to code table 18 (`ESC t 18`) for these bytes
//! to render correctly; [`EscPosBuilder`](super::EscPosBuilder) does that at
//! the start of every job. ASCII passes through unchanged. Characters with no
//! PC852 representation are replaced with `?`.

use tracing::warn;

/// Encode a Unicode string as PC852 bytes.
pub fn encode(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        if (ch as u32) < 0x80 {
            out.push(ch as u8);
        } else if let Some(byte) = unicode_to_pc852(ch) {
            out.push(byte);
        } else {
            warn!(
                character = %ch,
                codepoint = format!("U+{:04X}", ch as u32),
                "pc852: unmapped character, replacing with '?'"
            );
            out.push(b'?');
        }
    }
    out
}

/// Map a Unicode code point to its PC852 byte value (0x80–0xFF).
fn unicode_to_pc852(ch: char) -> Option<u8> {
    let byte = match ch {
        // 0x80–0x8F
        'Ç' => 0x80,
        'ü' => 0x81,
        'é' => 0x82,
        'â' => 0x83,
        'ä' => 0x84,
        'ů' => 0x85,
        'ć' => 0x86,
        'ç' => 0x87,
        'ł' => 0x88,
        'ë' => 0x89,
        'Ő' => 0x8A,
        'ő' => 0x8B,
        'î' => 0x8C,
        'Ź' => 0x8D,
        'Ä' => 0x8E,
        'Ć' => 0x8F,

        // 0x90–0x9F
        'É' => 0x90,
        'Ĺ' => 0x91,
        'ĺ' => 0x92,
        'ô' => 0x93,
        'ö' => 0x94,
        'Ľ' => 0x95,
        'ľ' => 0x96,
        'Ś' => 0x97,
        'ś' => 0x98,
        'Ö' => 0x99,
        'Ü' => 0x9A,
        'Ť' => 0x9B,
        'ť' => 0x9C,
        'Ł' => 0x9D,
        '×' => 0x9E,
        'č' => 0x9F,

        // 0xA0–0xAF
        'á' => 0xA0,
        'í' => 0xA1,
        'ó' => 0xA2,
        'ú' => 0xA3,
        'Ą' => 0xA4,
        'ą' => 0xA5,
        'Ž' => 0xA6,
        'ž' => 0xA7,
        'Ę' => 0xA8,
        'ę' => 0xA9,
        '¬' => 0xAA,
        'ź' => 0xAB,
        'Č' => 0xAC,
        'ş' => 0xAD,
        '«' => 0xAE,
        '»' => 0xAF,

        // 0xB0–0xBF
        '░' => 0xB0,
        '▒' => 0xB1,
        '▓' => 0xB2,
        '│' => 0xB3,
        '┤' => 0xB4,
        'Á' => 0xB5,
        'Â' => 0xB6,
        'Ě' => 0xB7,
        'Ş' => 0xB8,
        '╣' => 0xB9,
        '║' => 0xBA,
        '╗' => 0xBB,
        '╝' => 0xBC,
        'Ż' => 0xBD,
        'ż' => 0xBE,
        '┐' => 0xBF,

        // 0xC0–0xCF
        '└' => 0xC0,
        '┴' => 0xC1,
        '┬' => 0xC2,
        '├' => 0xC3,
        '─' => 0xC4,
        '┼' => 0xC5,
        'Ă' => 0xC6,
        'ă' => 0xC7,
        '╚' => 0xC8,
        '╔' => 0xC9,
        '╩' => 0xCA,
        '╦' => 0xCB,
        '╠' => 0xCC,
        '═' => 0xCD,
        '╬' => 0xCE,
        '¤' => 0xCF,

        // 0xD0–0xDF
        'đ' => 0xD0,
        'Đ' => 0xD1,
        'Ď' => 0xD2,
        'Ë' => 0xD3,
        'ď' => 0xD4,
        'Ň' => 0xD5,
        'Í' => 0xD6,
        'Î' => 0xD7,
        'ě' => 0xD8,
        '┘' => 0xD9,
        '┌' => 0xDA,
        '█' => 0xDB,
        '▄' => 0xDC,
        'Ţ' => 0xDD,
        'Ů' => 0xDE,
        '▀' => 0xDF,

        // 0xE0–0xEF
        'Ó' => 0xE0,
        'ß' => 0xE1,
        'Ô' => 0xE2,
        'Ń' => 0xE3,
        'ń' => 0xE4,
        'ň' => 0xE5,
        'Š' => 0xE6,
        'š' => 0xE7,
        'Ŕ' => 0xE8,
        'Ú' => 0xE9,
        'ŕ' => 0xEA,
        'Ű' => 0xEB,
        'ý' => 0xEC,
        'Ý' => 0xED,
        'ţ' => 0xEE,
        '´' => 0xEF,

        // 0xF0–0xFF
        '\u{AD}' => 0xF0, // soft hyphen
        '˝' => 0xF1,
        '˛' => 0xF2,
        'ˇ' => 0xF3,
        '˘' => 0xF4,
        '§' => 0xF5,
        '÷' => 0xF6,
        '¸' => 0xF7,
        '°' => 0xF8,
        '¨' => 0xF9,
        '˙' => 0xFA,
        'ű' => 0xFB,
        'Ř' => 0xFC,
        'ř' => 0xFD,
        '■' => 0xFE,
        '\u{A0}' => 0xFF, // no-break space

        _ => return None,
    };
    Some(byte)
}
