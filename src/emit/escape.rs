//! Byte-literal rendering of file contents.

use std::fmt::Write;

/// Bytes per rendered line.
pub const BYTES_PER_LINE: usize = 12;

/// Render `data` as comma-terminated `0xNN` literals, 12 per line, each line
/// prefixed with `indent` and ended with a newline.
///
/// # Example
///
/// ```
/// use easycert::emit::escape::escape_bytes;
///
/// assert_eq!(escape_bytes(b"-\n", "\t"), "\t0x2d, 0x0a,\n");
/// ```
pub fn escape_bytes(data: &[u8], indent: &str) -> String {
    // "0xNN, " is six characters
    let mut out = String::with_capacity(data.len() * 6 + data.len() / BYTES_PER_LINE * 2);

    for line in data.chunks(BYTES_PER_LINE) {
        out.push_str(indent);
        for (i, byte) in line.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            // Writing to a String cannot fail.
            let _ = write!(out, "0x{:02x},", byte);
        }
        out.push('\n');
    }

    out
}
