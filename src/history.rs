//! Per-widget undo/redo log, independent of the DOM.
//!
//! Each [`WidgetKey`] owns one [`HistoryEntry`]: `past` (oldest first, at
//! most [`HISTORY_LIMIT`] states), `current`, and `future` (redo stack, top
//! at the tail). Entries outlive their widget instance so a deleted node's
//! text can still be restored from the merged view.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use crate::constants::HISTORY_LIMIT;
use crate::models::WidgetKey;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryEntry {
    past: VecDeque<String>,
    current: String,
    future: Vec<String>,
}

impl HistoryEntry {
    pub fn past(&self) -> &VecDeque<String> {
        &self.past
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn future(&self) -> &[String] {
        &self.future
    }

    pub fn has_past(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn has_future(&self) -> bool {
        !self.future.is_empty()
    }

    /// No current text and nothing to undo or redo.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.past.is_empty() && self.future.is_empty()
    }

    /// Whether the sweeper must keep this entry's widget. Whitespace-only
    /// current text does not count.
    pub fn has_content(&self) -> bool {
        !self.current.trim().is_empty() || !self.past.is_empty() || !self.future.is_empty()
    }

    fn push(&mut self, text: &str) {
        let previous = std::mem::replace(&mut self.current, text.to_string());
        self.past.push_back(previous);
        while self.past.len() > HISTORY_LIMIT {
            self.past.pop_front();
        }
        self.future.clear();
    }
}

/// One row of the merged history view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub key: WidgetKey,
    pub text: String,
    pub is_current: bool,
    /// Whether the record belongs to the node of the widget that asked.
    pub is_focus_node: bool,
    /// Position in `past`; `past.len()` for the current state.
    pub index: usize,
}

#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: HashMap<WidgetKey, HistoryEntry>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the entry if absent. With `clear`, reset it to empty.
    pub fn init_or_clear(&mut self, key: &WidgetKey, clear: bool) {
        let entry = self.entries.entry(key.clone()).or_default();
        if clear {
            *entry = HistoryEntry::default();
        }
    }

    /// Record `text` as the new current state. Skipped when it equals the
    /// current state or already sits in `past`. Returns whether it was recorded.
    pub fn record(&mut self, key: &WidgetKey, text: &str) -> bool {
        let entry = self.entries.entry(key.clone()).or_default();
        if entry.current == text || entry.past.iter().any(|t| t == text) {
            return false;
        }
        entry.push(text);
        true
    }

    /// Record `text` unconditionally, duplicates included.
    pub fn force_record(&mut self, key: &WidgetKey, text: &str) {
        self.entries.entry(key.clone()).or_default().push(text);
    }

    /// Step back one state. Returns the new current text, `None` if there is nothing to undo.
    pub fn undo(&mut self, key: &WidgetKey) -> Option<String> {
        let entry = self.entries.get_mut(key)?;
        let previous = entry.past.pop_back()?;
        let undone = std::mem::replace(&mut entry.current, previous);
        entry.future.push(undone);
        Some(entry.current.clone())
    }

    /// Re-apply the most recently undone state.
    pub fn redo(&mut self, key: &WidgetKey) -> Option<String> {
        let entry = self.entries.get_mut(key)?;
        let next = entry.future.pop()?;
        let replaced = std::mem::replace(&mut entry.current, next);
        entry.past.push_back(replaced);
        while entry.past.len() > HISTORY_LIMIT {
            entry.past.pop_front();
        }
        Some(entry.current.clone())
    }

    pub fn clear(&mut self, key: &WidgetKey) {
        self.init_or_clear(key, true);
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn remove(&mut self, key: &WidgetKey) {
        self.entries.remove(key);
    }

    pub fn get(&self, key: &WidgetKey) -> Option<&HistoryEntry> {
        self.entries.get(key)
    }

    /// True when no entry exists or the entry holds nothing.
    pub fn is_empty(&self, key: &WidgetKey) -> bool {
        self.entries.get(key).map_or(true, HistoryEntry::is_empty)
    }

    /// True when the entry keeps something worth restoring.
    pub fn has_content(&self, key: &WidgetKey) -> bool {
        self.entries.get(key).is_some_and(HistoryEntry::has_content)
    }

    pub fn button_state(&self, key: &WidgetKey) -> (bool, bool) {
        self.entries
            .get(key)
            .map_or((false, false), |e| (e.has_past(), e.has_future()))
    }

    /// Every non-empty current and past state across all widgets, ordered for display:
    /// the focused node first, then by numeric node id, then by input id,
    /// newest state first within one widget.
    pub fn merged_records(&self, focus: &WidgetKey) -> Vec<HistoryRecord> {
        let focus_node = focus.node_id();
        let mut records = Vec::new();

        for (key, entry) in &self.entries {
            if entry.past.is_empty() && entry.current.is_empty() {
                continue;
            }
            let is_focus_node = key.node_id() == focus_node;
            if !entry.current.is_empty() {
                records.push(HistoryRecord {
                    key: key.clone(),
                    text: entry.current.clone(),
                    is_current: true,
                    is_focus_node,
                    index: entry.past.len(),
                });
            }
            for (index, text) in entry.past.iter().enumerate() {
                if text.is_empty() {
                    continue;
                }
                records.push(HistoryRecord {
                    key: key.clone(),
                    text: text.clone(),
                    is_current: false,
                    is_focus_node,
                    index,
                });
            }
        }

        records.sort_by(compare_records);
        records
    }
}

fn numeric_node_id(key: &WidgetKey) -> u64 {
    let digits: String = key.node_id().chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

fn compare_records(a: &HistoryRecord, b: &HistoryRecord) -> Ordering {
    b.is_focus_node
        .cmp(&a.is_focus_node)
        .then_with(|| {
            if a.key.node_id() == b.key.node_id() {
                Ordering::Equal
            } else {
                numeric_node_id(&a.key).cmp(&numeric_node_id(&b.key))
            }
        })
        .then_with(|| a.key.input_id().cmp(b.key.input_id()))
        .then_with(|| b.index.cmp(&a.index))
}
