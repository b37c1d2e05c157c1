//! Text helpers for chat capture and logging.
//! Chat replies are delivered as plain text and every user string is escaped
//! before it reaches a log line so logs stay single-line.

/// Marker that introduces a legacy formatting code (`§a`, `§l`, `§x§f§f...`).
const FORMAT_MARKER: char = '§';

/// Remove legacy formatting codes, keeping the visible text verbatim.
/// A trailing marker with no code character is dropped.
pub fn strip_formatting(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == FORMAT_MARKER {
            // Skip the code character that follows the marker.
            chars.next();
            continue;
        }
        out.push(ch);
    }
    out
}

/// Escape a string for single-line logging:
/// - `\n` => `\\n`
/// - `\r` => `\\r`
/// - `\t` => `\\t`
/// - backslash => `\\\\`
///   Truncates very long strings with an ellipsis to cap log noise.
pub fn escape_log(s: &str) -> String {
    const MAX_PREVIEW: usize = 200;
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
