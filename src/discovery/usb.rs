//! # USB Enumeration Parsing
//!
//! Parses `lsusb` output into [`UsbDeviceRecord`]s.
//!
//! ```text
//! Bus 001 Device 003: ID 04b8:0202 Seiko Epson Corp. TM-T88V
//! ```
//!
//! Lines that don't match the pattern are dropped.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static LSUSB_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Bus\s+(\d+)\s+Device\s+(\d+):\s+ID\s+([0-9a-fA-F]{4}):([0-9a-fA-F]{4})\s+(.+)$")
        .expect("lsusb pattern is valid")
});

static MODEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(TM-[A-Z0-9]+)\b").expect("model pattern is valid"));

/// One USB device as reported by the enumeration tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsbDeviceRecord {
    pub bus: String,
    pub device: String,
    /// `0x`-prefixed, case as reported (e.g. `0x04b8`)
    pub vendor_id: String,
    pub product_id: String,
    pub vendor_id_decimal: u16,
    pub product_id_decimal: u16,
    pub name: String,
    pub display_name: String,
    /// `TM-xxxx` token from the name, or the full name
    pub model: String,
}

impl UsbDeviceRecord {
    /// Whether this record carries the given vendor/product pair.
    ///
    /// Comparison ignores case and an optional `0x` prefix on either side.
    pub fn matches(&self, vendor_id: &str, product_id: &str) -> bool {
        normalize_id(&self.vendor_id) == normalize_id(vendor_id)
            && normalize_id(&self.product_id) == normalize_id(product_id)
    }
}

/// Lowercase, trim and strip a leading `0x`.
///
/// ## Example
///
/// ```
/// use receipt_bridge::discovery::usb::normalize_id;
///
/// assert_eq!(normalize_id("0x04B8"), "04b8");
/// assert_eq!(normalize_id(" 04b8 "), "04b8");
/// ```
pub fn normalize_id(id: &str) -> String {
    let lower = id.trim().to_ascii_lowercase();
    match lower.strip_prefix("0x") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

/// Parse a single `lsusb` line.
pub fn parse_line(line: &str) -> Option<UsbDeviceRecord> {
    let caps = LSUSB_LINE.captures(line.trim())?;
    let vendor = &caps[3];
    let product = &caps[4];
    let name = caps[5].trim().to_string();

    Some(UsbDeviceRecord {
        bus: caps[1].to_string(),
        device: caps[2].to_string(),
        vendor_id: format!("0x{}", vendor),
        product_id: format!("0x{}", product),
        vendor_id_decimal: u16::from_str_radix(vendor, 16).ok()?,
        product_id_decimal: u16::from_str_radix(product, 16).ok()?,
        model: extract_model(&name),
        display_name: name.clone(),
        name,
    })
}

/// Parse a full `lsusb` listing. Empty input yields no records.
pub fn parse_listing(output: &str) -> Vec<UsbDeviceRecord> {
    output.lines().filter_map(parse_line).collect()
}

/// Whether any record in `records` carries the given pair.
pub fn find_configured<'a>(
    records: &'a [UsbDeviceRecord],
    vendor_id: &str,
    product_id: &str,
) -> Option<&'a UsbDeviceRecord> {
    records.iter().find(|r| r.matches(vendor_id, product_id))
}

fn extract_model(name: &str) -> String {
    MODEL
        .captures(name)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LISTING: &str = "\
Bus 002 Device 001: ID 1d6b:0003 Linux Foundation 3.0 root hub
Bus 001 Device 003: ID 04b8:0202 Seiko Epson Corp. TM-T88V
garbage line
Bus 001 Device 004: ID 04B8:0E27 Seiko Epson Corp.
";

    #[test]
    fn test_parse_epson_line() {
        let record =
            parse_line("Bus 001 Device 003: ID 04b8:0202 Seiko Epson Corp. TM-T88V").unwrap();
        assert_eq!(
            record,
            UsbDeviceRecord {
                bus: "001".into(),
                device: "003".into(),
                vendor_id: "0x04b8".into(),
                product_id: "0x0202".into(),
                vendor_id_decimal: 1208,
                product_id_decimal: 514,
                name: "Seiko Epson Corp. TM-T88V".into(),
                display_name: "Seiko Epson Corp. TM-T88V".into(),
                model: "TM-T88V".into(),
            }
        );
    }

    #[test]
    fn test_model_falls_back_to_name() {
        let record = parse_line("Bus 002 Device 001: ID 1d6b:0003 Linux Foundation 3.0 root hub")
            .unwrap();
        assert_eq!(record.model, "Linux Foundation 3.0 root hub");
    }

    #[test]
    fn test_non_matching_lines_are_dropped() {
        let records = parse_listing(LISTING);
        assert_eq!(records.len(), 3);
        assert!(parse_listing("").is_empty());
        assert!(parse_line("ID 04b8:0202").is_none());
    }

    #[test]
    fn test_matches_ignores_case_and_prefix() {
        let records = parse_listing(LISTING);
        assert!(find_configured(&records, "0x04b8", "0x0202").is_some());
        assert!(find_configured(&records, "04B8", "0202").is_some());
        assert!(find_configured(&records, "0X04B8", "0x0e27").is_some());
        assert!(find_configured(&records, "04b8", "9999").is_none());
    }

    #[test]
    fn test_decimal_ids_are_compared_verbatim() {
        let records = parse_listing(LISTING);
        assert!(find_configured(&records, "1208", "514").is_none());
    }
}
