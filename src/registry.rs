//! Live widget instances, one per [`WidgetKey`].
//!
//! The registry is the only owner of an [`InstanceRecord`]. Anything that
//! survives an `.await` must look the record up again by key; a missing record
//! means the widget was torn down meanwhile.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::history::HistoryStore;
use crate::models::{OperationKind, WidgetKey};

// ---------------------------------------------------------------------------
// Text buffer seam
// ---------------------------------------------------------------------------

/// The externally owned text input a widget is attached to.
///
/// Cursor positions are UTF-16 offsets, like `selectionStart`.
pub trait TextBuffer {
    fn value(&self) -> String;
    fn set_value(&self, text: &str);
    fn cursor(&self) -> Option<usize>;
    fn set_cursor(&self, pos: usize);

    fn as_any(&self) -> &dyn Any;

    /// Whether `other` is backed by the same underlying input.
    fn same_target(&self, other: &dyn TextBuffer) -> bool;
}

thread_local! {
    static NEXT_BUFFER_ID: Cell<u64> = const { Cell::new(1) };
}

/// Headless [`TextBuffer`]. Clones share the same text, so a clone counts as
/// the same target.
#[derive(Clone)]
pub struct MemoryBuffer {
    id: u64,
    text: Rc<RefCell<String>>,
    cursor: Rc<Cell<Option<usize>>>,
}

impl MemoryBuffer {
    pub fn new(text: &str) -> Self {
        let id = NEXT_BUFFER_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            id
        });
        Self {
            id,
            text: Rc::new(RefCell::new(text.to_string())),
            cursor: Rc::new(Cell::new(None)),
        }
    }

    pub fn with_cursor(text: &str, cursor: usize) -> Self {
        let buffer = Self::new(text);
        buffer.cursor.set(Some(cursor));
        buffer
    }
}

impl TextBuffer for MemoryBuffer {
    fn value(&self) -> String {
        self.text.borrow().clone()
    }

    fn set_value(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
    }

    fn cursor(&self) -> Option<usize> {
        self.cursor.get()
    }

    fn set_cursor(&self, pos: usize) {
        self.cursor.set(Some(pos));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn same_target(&self, other: &dyn TextBuffer) -> bool {
        other
            .as_any()
            .downcast_ref::<MemoryBuffer>()
            .is_some_and(|o| o.id == self.id)
    }
}

// ---------------------------------------------------------------------------
// Host graph seam
// ---------------------------------------------------------------------------

/// Read-only view of the host editor's node graph.
pub trait HostGraph {
    fn node_exists(&self, node_id: &str) -> bool;
}

impl<F> HostGraph for F
where
    F: Fn(&str) -> bool,
{
    fn node_exists(&self, node_id: &str) -> bool {
        self(node_id)
    }
}

// ---------------------------------------------------------------------------
// Instance records
// ---------------------------------------------------------------------------

/// Busy state of one widget. Translate and expand exclude each other.
///
/// The generation identifies the request that set the state so a late
/// completion of an older request cannot clear a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationState {
    #[default]
    Idle,
    Translating { generation: u64 },
    Expanding { generation: u64 },
}

impl OperationState {
    pub fn busy_with(&self) -> Option<OperationKind> {
        match self {
            OperationState::Idle => None,
            OperationState::Translating { .. } => Some(OperationKind::Translate),
            OperationState::Expanding { .. } => Some(OperationKind::Expand),
        }
    }

    pub fn generation(&self) -> Option<u64> {
        match self {
            OperationState::Idle => None,
            OperationState::Translating { generation }
            | OperationState::Expanding { generation } => Some(*generation),
        }
    }
}

pub type Teardown = Box<dyn FnOnce()>;

pub struct InstanceRecord {
    pub widget_key: WidgetKey,
    pub node_id: String,
    pub input_id: String,
    /// Buffer text at the last sync.
    pub current_text: String,
    pub state: OperationState,
    /// Text before the last translation; decides the restore direction.
    pub original_text: Option<String>,
    /// Translate request already settled by a push update while its HTTP
    /// response was still in flight.
    pub settled_generation: Option<u64>,
    pub buffer: Option<Rc<dyn TextBuffer>>,
    teardown: Option<Teardown>,
}

impl InstanceRecord {
    pub fn new(node_id: &str, input_id: &str, buffer: Option<Rc<dyn TextBuffer>>) -> Self {
        let current_text = buffer.as_ref().map(|b| b.value()).unwrap_or_default();
        Self {
            widget_key: WidgetKey::new(node_id, input_id),
            node_id: node_id.to_string(),
            input_id: input_id.to_string(),
            current_text,
            state: OperationState::Idle,
            original_text: None,
            settled_generation: None,
            buffer,
            teardown: None,
        }
    }

    /// Run `teardown` when the record leaves the registry (listeners, DOM).
    pub fn with_teardown(mut self, teardown: Teardown) -> Self {
        self.teardown = Some(teardown);
        self
    }

    pub fn is_translating(&self) -> bool {
        matches!(self.state, OperationState::Translating { .. })
    }

    pub fn is_expanding(&self) -> bool {
        matches!(self.state, OperationState::Expanding { .. })
    }

    /// Buffer text, falling back to the last synced text when detached.
    pub fn text(&self) -> String {
        self.buffer
            .as_ref()
            .map(|b| b.value())
            .unwrap_or_else(|| self.current_text.clone())
    }

    fn destroy(mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl fmt::Debug for InstanceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceRecord")
            .field("widget_key", &self.widget_key)
            .field("current_text", &self.current_text)
            .field("state", &self.state)
            .field("original_text", &self.original_text)
            .field("has_buffer", &self.buffer.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InstanceRegistry {
    records: HashMap<WidgetKey, InstanceRecord>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record`, tearing down any record already under its key.
    pub fn add(&mut self, record: InstanceRecord) {
        let key = record.widget_key.clone();
        if let Some(old) = self.records.remove(&key) {
            debug_log!("replacing widget instance {}", key);
            old.destroy();
        }
        self.records.insert(key, record);
    }

    pub fn get(&self, key: &WidgetKey) -> Option<&InstanceRecord> {
        self.records.get(key)
    }

    pub fn get_mut(&mut self, key: &WidgetKey) -> Option<&mut InstanceRecord> {
        self.records.get_mut(key)
    }

    /// Tear down and drop the record. Returns whether one existed.
    pub fn remove(&mut self, key: &WidgetKey) -> bool {
        match self.records.remove(key) {
            Some(record) => {
                record.destroy();
                true
            }
            None => false,
        }
    }

    pub fn has(&self, key: &WidgetKey) -> bool {
        self.records.contains_key(key)
    }

    /// True when there is no record or its history holds nothing.
    pub fn is_empty(&self, key: &WidgetKey, history: &HistoryStore) -> bool {
        !self.has(key) || history.is_empty(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn keys(&self) -> Vec<WidgetKey> {
        self.records.keys().cloned().collect()
    }

    /// Records attached to inputs of `node_id`.
    pub fn keys_for_node(&self, node_id: &str) -> Vec<WidgetKey> {
        let mut keys: Vec<WidgetKey> = self
            .records
            .values()
            .filter(|r| r.node_id == node_id)
            .map(|r| r.widget_key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Drop records whose node is gone, or whose widget never held anything.
    /// Records with history content are always kept.
    pub fn sweep_unused(&mut self, history: &HistoryStore, host: &dyn HostGraph) -> usize {
        let doomed: Vec<WidgetKey> = self
            .records
            .values()
            .filter(|record| {
                let key = &record.widget_key;
                if history.has_content(key) {
                    return false;
                }
                let node_exists = host.node_exists(&record.node_id);
                !node_exists || self.is_empty(key, history)
            })
            .map(|record| record.widget_key.clone())
            .collect();

        for key in &doomed {
            self.remove(key);
        }
        doomed.len()
    }

    /// Tear down every record. Returns how many were dropped.
    pub fn clear_all(&mut self) -> usize {
        let count = self.records.len();
        for (_, record) in self.records.drain() {
            record.destroy();
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attach(registry: &mut InstanceRegistry, node: &str, text: &str) -> WidgetKey {
        let record = InstanceRecord::new(node, "text", Some(Rc::new(MemoryBuffer::new(text))));
        let key = record.widget_key.clone();
        registry.add(record);
        key
    }

    #[test]
    fn add_replaces_and_tears_down_previous() {
        let torn = Rc::new(Cell::new(0));
        let mut registry = InstanceRegistry::new();

        let t = torn.clone();
        registry.add(
            InstanceRecord::new("1", "text", None).with_teardown(Box::new(move || t.set(t.get() + 1))),
        );
        registry.add(InstanceRecord::new("1", "text", None));

        assert_eq!(registry.len(), 1);
        assert_eq!(torn.get(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut registry = InstanceRegistry::new();
        let key = attach(&mut registry, "1", "a");
        assert!(registry.remove(&key));
        assert!(!registry.remove(&key));
        assert!(registry.get(&key).is_none());
    }

    #[test]
    fn sweep_keeps_history_of_deleted_node() {
        let mut registry = InstanceRegistry::new();
        let mut history = HistoryStore::new();

        let kept = attach(&mut registry, "1", "hello");
        history.record(&kept, "hello");
        let empty_gone = attach(&mut registry, "2", "");
        history.init_or_clear(&empty_gone, false);
        let empty_live = attach(&mut registry, "3", "");
        let live = attach(&mut registry, "4", "x");
        history.record(&live, "x");

        let host = |id: &str| id == "3" || id == "4";
        let removed = registry.sweep_unused(&history, &host);

        assert_eq!(removed, 2);
        assert!(registry.has(&kept));
        assert!(registry.has(&live));
        assert!(!registry.has(&empty_gone));
        assert!(!registry.has(&empty_live));
    }

    #[test]
    fn cleared_history_releases_record() {
        let mut registry = InstanceRegistry::new();
        let mut history = HistoryStore::new();
        let key = attach(&mut registry, "9", "draft");
        history.record(&key, "draft");
        assert_eq!(registry.sweep_unused(&history, &|_: &str| false), 0);

        history.clear(&key);
        assert_eq!(registry.sweep_unused(&history, &|_: &str| false), 1);
    }

    #[test]
    fn memory_buffer_clone_is_same_target() {
        let a = MemoryBuffer::new("x");
        let b = a.clone();
        let c = MemoryBuffer::new("x");
        assert!(a.same_target(&b));
        assert!(!a.same_target(&c));
    }

    #[test]
    fn clear_all_tears_down_everything() {
        let torn = Rc::new(Cell::new(0));
        let mut registry = InstanceRegistry::new();
        for node in ["1", "2", "3"] {
            let t = torn.clone();
            registry.add(
                InstanceRecord::new(node, "text", None)
                    .with_teardown(Box::new(move || t.set(t.get() + 1))),
            );
        }
        assert_eq!(registry.clear_all(), 3);
        assert_eq!(torn.get(), 3);
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn keys_for_node_lists_every_input() {
        let mut registry = InstanceRegistry::new();
        registry.add(InstanceRecord::new("5", "text_l", None));
        registry.add(InstanceRecord::new("5", "text_g", None));
        registry.add(InstanceRecord::new("6", "text", None));
        assert_eq!(
            registry.keys_for_node("5"),
            vec![WidgetKey::new("5", "text_g"), WidgetKey::new("5", "text_l")]
        );
    }
}
