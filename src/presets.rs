//! Comma-aware splicing of preset snippets into prompt text.
//!
//! Prompt text is treated as a comma-separated tag list. Every result is
//! normalised to `"a, b, c"`: segments trimmed, empty segments dropped.
//! Nothing here touches the DOM or the stores.

use crate::utils::{byte_index_at_utf16, utf16_len};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetEdit {
    /// New text plus the caret (UTF-16 units) to restore, when one was given.
    Applied { text: String, cursor: Option<usize> },
    AlreadyPresent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetRemoval {
    Removed(String),
    NotPresent,
}

/// Insert `preset` at `cursor` (or at the end when there is no caret).
pub fn apply(current: &str, preset: &str, cursor: Option<usize>) -> PresetEdit {
    let clean = strip_commas(preset);
    if clean.is_empty() || current.contains(preset) || current.contains(clean) {
        return PresetEdit::AlreadyPresent;
    }

    if current.trim().is_empty() {
        return PresetEdit::Applied {
            text: normalize(clean),
            cursor: cursor.map(|_| utf16_len(&normalize(clean))),
        };
    }

    match cursor {
        Some(pos) => {
            let split = byte_index_at_utf16(current, pos);
            let (before, after) = current.split_at(split);
            let head = normalize(&format!("{},{}", before, clean));
            let tail = normalize(after);
            let text = if tail.is_empty() {
                head.clone()
            } else {
                format!("{}, {}", head, tail)
            };
            PresetEdit::Applied {
                text,
                cursor: Some(utf16_len(&head)),
            }
        }
        None => PresetEdit::Applied {
            text: normalize(&format!("{},{}", current, clean)),
            cursor: None,
        },
    }
}

/// Remove the first occurrence of `preset`, preferring a whole segment match.
pub fn remove(current: &str, preset: &str) -> PresetRemoval {
    if preset.is_empty() || !current.contains(preset) {
        return PresetRemoval::NotPresent;
    }

    let target = strip_commas(preset);
    let mut segments: Vec<&str> = current.split(',').map(str::trim).collect();
    let stripped = match segments.iter().position(|seg| *seg == target) {
        Some(idx) => {
            segments.remove(idx);
            segments.join(",")
        }
        None => current.replacen(preset, "", 1),
    };
    PresetRemoval::Removed(normalize(&stripped))
}

/// Collapse `text` into a clean `", "`-joined list.
pub fn normalize(text: &str) -> String {
    text.split(',')
        .map(str::trim)
        .filter(|seg| !seg.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn strip_commas(s: &str) -> &str {
    s.trim().trim_matches(',').trim()
}
