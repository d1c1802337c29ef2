//! Introspection over the current EDID snapshot: human-readable and binary
//! dumps, plus raw byte writes for injecting hand-edited blocks.

use std::fmt::Write;

use edid::Edid;

/// Hex dump of the current snapshot, 16 bytes per line:
///
/// ```text
/// edid[000] = 00 ff ff ff ff ff ff 00 ...
/// ```
pub fn dump_ascii<B>(edid: &Edid<B>) -> String {
    let data = match edid.snapshot() {
        Some(data) => data,
        None => return "No EDID\n".to_string(),
    };

    let mut out = String::new();
    for (i, byte) in data.raw.as_bytes().iter().enumerate() {
        if i % 16 == 0 {
            let _ = write!(out, "edid[{:03x}] =", i);
        }
        let _ = write!(out, " {:02x}", byte);
        if i % 16 == 15 {
            out.push('\n');
        }
    }
    out
}

/// The raw snapshot bytes, or an empty vector when nothing is installed.
pub fn dump_binary<B>(edid: &Edid<B>) -> Vec<u8> {
    match edid.snapshot() {
        Some(data) => data.raw.as_bytes().to_vec(),
        None => Vec::new(),
    }
}

/// Writes bytes into a copy of the raw buffer and installs the copy as the
/// new snapshot. Returns how many bytes landed.
pub fn write_raw<B>(edid: &Edid<B>, offset: usize, bytes: &[u8]) -> edid::Result<usize> {
    edid.patch(offset, bytes)
}
