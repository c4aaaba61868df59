//! Serial / USB character-device candidates.
//!
//! Scans a device directory for node names that USB printers and USB-serial
//! adapters show up under:
//!
//! | Pattern | Platform |
//! |---------|----------|
//! | `cu.*`, `tty.*` | macOS |
//! | `ttyUSB*`, `ttyACM*` | Linux USB-serial |
//! | `usb/lp*` | Linux usblp |

use std::fs;
use std::path::Path;

/// Cap on candidates returned by one scan.
pub const MAX_CANDIDATES: usize = 20;

const NAME_PREFIXES: &[&str] = &["cu.", "tty.", "ttyUSB", "ttyACM"];

/// Whether a device node name looks like a printer or serial adapter.
pub fn is_candidate_name(name: &str) -> bool {
    NAME_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix) && name.len() > prefix.len())
}

/// List candidate device paths under `dev_dir`.
///
/// A missing or unreadable directory yields an empty list. Order is the
/// sorted listing order.
pub fn scan(dev_dir: &Path) -> Vec<String> {
    let mut found = list_matching(dev_dir, is_candidate_name);
    found.extend(list_matching(&dev_dir.join("usb"), |name| {
        name.starts_with("lp")
    }));

    found
        .into_iter()
        .filter(|p| Path::new(p).exists())
        .take(MAX_CANDIDATES)
        .collect()
}

fn list_matching(dir: &Path, accept: impl Fn(&str) -> bool) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| accept(name))
        .collect();
    names.sort();

    names
        .into_iter()
        .map(|name| dir.join(name).to_string_lossy().into_owned())
        .collect()
}
