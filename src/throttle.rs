//! Per-node debounce against resubmitting the same text.

use std::collections::HashMap;

use crate::constants::THROTTLE_INTERVAL_MS;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThrottleRecord {
    pub last_request_time: i64,
    pub last_request_text: String,
}

#[derive(Debug, Default)]
pub struct ThrottleTable {
    records: HashMap<String, ThrottleRecord>,
}

impl ThrottleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when `node_id` sent `text` less than a second ago.
    ///
    /// A rejected call leaves the record untouched; an accepted one stamps it.
    pub fn should_throttle(&mut self, node_id: &str, text: &str, now_ms: i64) -> bool {
        if let Some(last) = self.records.get(node_id) {
            if last.last_request_text == text
                && now_ms - last.last_request_time < THROTTLE_INTERVAL_MS
            {
                log::warn!("node {} requested too often, throttled", node_id);
                return true;
            }
        }
        self.records.insert(
            node_id.to_string(),
            ThrottleRecord {
                last_request_time: now_ms,
                last_request_text: text.to_string(),
            },
        );
        false
    }

    /// Refresh the timestamp only (push progress for a running translation).
    pub fn touch(&mut self, node_id: &str, now_ms: i64) {
        self.records
            .entry(node_id.to_string())
            .or_default()
            .last_request_time = now_ms;
    }

    pub fn get(&self, node_id: &str) -> Option<&ThrottleRecord> {
        self.records.get(node_id)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
