//! Utility helpers shared across the widget core.
//!
//! Text inputs report caret positions in UTF-16 code units while Rust strings
//! are indexed by bytes; the helpers below convert between the two.

/// Return the current timestamp in **milliseconds** since UNIX epoch.
///
/// Goes through chrono so the same call works in the browser (`wasmbind`) and
/// in native tests.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Length of `s` in UTF-16 code units, the unit used by `selectionStart`.
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Byte index of the char boundary at or before UTF-16 offset `pos`.
///
/// Offsets past the end clamp to `s.len()`; an offset that falls inside a
/// surrogate pair snaps back to the start of that character.
pub fn byte_index_at_utf16(s: &str, pos: usize) -> usize {
    let mut units = 0;
    for (idx, ch) in s.char_indices() {
        let next = units + ch.len_utf16();
        if next > pos {
            return idx;
        }
        units = next;
    }
    s.len()
}

/// Truncate `s` to at most `max` characters for log output.
pub fn preview(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
