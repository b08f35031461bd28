//! Translate / expand orchestration.
//!
//! Per widget only one backend operation may be in flight; a second request
//! is rejected, never queued. Every store mutation is synchronous and no
//! `RefCell` borrow is held across an `.await` or while calling into the
//! status sink (which may call back into JS).
//!
//! A translation can complete twice: once through the HTTP response and once
//! through a `prompt_translate_update` push. Whichever lands first is merged
//! through [`OperationCoordinator::apply_translation_result`]; a push marks
//! the request generation settled, and the HTTP response for a settled
//! generation is reported but never merged again.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::constants::{
    MSG_CONFIG_UPDATED, MSG_EXPANDING, MSG_EXPAND_BUSY, MSG_EXPAND_DONE, MSG_EXPAND_FAILED,
    MSG_HISTORY_CLEARED, MSG_NOTHING_TO_EXPAND, MSG_NOTHING_TO_TRANSLATE, MSG_NO_HISTORY,
    MSG_NO_PRESETS, MSG_PRESET_APPLIED, MSG_PRESET_EXISTS, MSG_PRESET_NOT_FOUND,
    MSG_PRESET_REMOVED, MSG_RESTORED, MSG_RESTORED_ORIGINAL, MSG_RESTORED_TRANSLATION,
    MSG_THROTTLED, MSG_TRANSLATE_BUSY, MSG_TRANSLATE_DONE,
    MSG_TRANSLATE_FAILED, MSG_TRANSLATING, RESTORE_ORIGINAL_DESC,
};
use crate::errors::WidgetError;
use crate::history::{HistoryRecord, HistoryStore};
use crate::language::detect_direction;
use crate::messages::{ButtonState, OperationOutcome, StatusKind};
use crate::models::{OperationKind, Preset, TranslateDirection, WidgetConfig, WidgetKey};
use crate::network::messages::{
    ConfigUpdate, ExpandRequest, PushEvent, TranslateRequest, TranslateResult, TranslateUpdate,
    UpdateStatus,
};
use crate::network::PromptBackend;
use crate::presets::{self, PresetEdit, PresetRemoval};
use crate::registry::{InstanceRegistry, OperationState, TextBuffer};
use crate::settings::{Feature, FeatureFlags};
use crate::throttle::ThrottleTable;
use crate::toast::StatusSink;
use crate::translation_cache::TranslationCache;
use crate::utils::{now_ms, preview};

type Clock = Box<dyn Fn() -> i64>;

/// Outcome of the synchronous half of `translate_text`.
enum TranslateStep {
    Served(OperationOutcome),
    Request {
        req: TranslateRequest,
        direction: TranslateDirection,
        generation: u64,
    },
}

/// How a translate response relates to the widget it was issued for.
enum Delivery {
    /// Still the in-flight request.
    Live,
    /// A push update already merged this request's result.
    Settled,
    Stale,
}

pub struct OperationCoordinator {
    registry: RefCell<InstanceRegistry>,
    history: RefCell<HistoryStore>,
    cache: RefCell<TranslationCache>,
    throttle: RefCell<ThrottleTable>,
    flags: RefCell<FeatureFlags>,
    presets: RefCell<Option<Vec<Preset>>>,
    next_generation: Cell<u64>,
    backend: Rc<dyn PromptBackend>,
    status: Rc<dyn StatusSink>,
    clock: Clock,
}

impl OperationCoordinator {
    pub fn new(backend: Rc<dyn PromptBackend>, status: Rc<dyn StatusSink>) -> Self {
        Self {
            registry: RefCell::new(InstanceRegistry::new()),
            history: RefCell::new(HistoryStore::new()),
            cache: RefCell::new(TranslationCache::new()),
            throttle: RefCell::new(ThrottleTable::new()),
            flags: RefCell::new(FeatureFlags::default()),
            presets: RefCell::new(None),
            next_generation: Cell::new(1),
            backend,
            status,
            clock: Box::new(now_ms),
        }
    }

    /// Replace the wall clock used for throttling.
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_cache(self, cache: TranslationCache) -> Self {
        *self.cache.borrow_mut() = cache;
        self
    }

    // ----------------------------------------------------------------------
    // Store access
    // ----------------------------------------------------------------------

    pub fn registry(&self) -> Ref<'_, InstanceRegistry> {
        self.registry.borrow()
    }

    pub fn registry_mut(&self) -> RefMut<'_, InstanceRegistry> {
        self.registry.borrow_mut()
    }

    pub fn history(&self) -> Ref<'_, HistoryStore> {
        self.history.borrow()
    }

    pub fn history_mut(&self) -> RefMut<'_, HistoryStore> {
        self.history.borrow_mut()
    }

    pub fn cache_mut(&self) -> RefMut<'_, TranslationCache> {
        self.cache.borrow_mut()
    }

    pub fn flags(&self) -> Ref<'_, FeatureFlags> {
        self.flags.borrow()
    }

    pub fn flags_mut(&self) -> RefMut<'_, FeatureFlags> {
        self.flags.borrow_mut()
    }

    pub fn status(&self) -> &Rc<dyn StatusSink> {
        &self.status
    }

    fn next_generation(&self) -> u64 {
        let generation = self.next_generation.get();
        self.next_generation.set(generation + 1);
        generation
    }

    fn buffer_of(&self, key: &WidgetKey) -> Result<Rc<dyn TextBuffer>, WidgetError> {
        let registry = self.registry.borrow();
        let record = registry
            .get(key)
            .ok_or_else(|| WidgetError::MissingInstance(key.clone()))?;
        record
            .buffer
            .clone()
            .ok_or_else(|| WidgetError::MissingTextBuffer(key.clone()))
    }

    /// Push `text` into the widget's input and the record mirror.
    fn write_buffer(&self, key: &WidgetKey, text: &str) {
        let buffer = {
            let mut registry = self.registry.borrow_mut();
            let Some(record) = registry.get_mut(key) else {
                return;
            };
            record.current_text = text.to_string();
            record.buffer.clone()
        };
        // The DOM buffer fires an `input` event; no borrow may be live here.
        if let Some(buffer) = buffer {
            if buffer.value() != text {
                buffer.set_value(text);
            }
        }
    }

    pub fn button_state(&self, key: &WidgetKey) -> ButtonState {
        let (has_past, has_future) = self.history.borrow().button_state(key);
        ButtonState {
            has_past,
            has_future,
        }
    }

    pub fn emit_buttons(&self, key: &WidgetKey) {
        let state = self.button_state(key);
        self.status.buttons_changed(key, state);
    }

    /// Surface a rejected request. Lookup failures have no widget to anchor a
    /// tip to and are only logged.
    fn report_rejection(&self, key: &WidgetKey, err: &WidgetError) {
        let (kind, message) = match err {
            WidgetError::Busy(OperationKind::Translate) => (StatusKind::Loading, MSG_TRANSLATE_BUSY),
            WidgetError::Busy(OperationKind::Expand) => (StatusKind::Loading, MSG_EXPAND_BUSY),
            WidgetError::EmptyText(OperationKind::Translate) => {
                (StatusKind::Error, MSG_NOTHING_TO_TRANSLATE)
            }
            WidgetError::EmptyText(OperationKind::Expand) => (StatusKind::Error, MSG_NOTHING_TO_EXPAND),
            WidgetError::Throttled => (StatusKind::Error, MSG_THROTTLED),
            other => {
                log::warn!("[{}] rejected: {}", key, other);
                return;
            }
        };
        log::warn!("[{}] {}", key, message);
        self.status.show(key, kind, message);
    }

    fn report_failure(&self, key: &WidgetKey, kind: OperationKind, err: &WidgetError) {
        let message = match err {
            WidgetError::Backend(msg) => msg.clone(),
            other => {
                let prefix = match kind {
                    OperationKind::Translate => MSG_TRANSLATE_FAILED,
                    OperationKind::Expand => MSG_EXPAND_FAILED,
                };
                format!("{}: {}", prefix, other)
            }
        };
        log::error!("[{}] {} failed: {}", key, kind, err);
        self.status.show(key, StatusKind::Error, &message);
    }

    /// Validate that `key` can start `kind` and return the text to work on.
    fn guard(&self, key: &WidgetKey, kind: OperationKind) -> Result<String, WidgetError> {
        let feature = match kind {
            OperationKind::Translate => Feature::Translate,
            OperationKind::Expand => Feature::Expand,
        };
        self.flags.borrow().require(feature)?;

        let registry = self.registry.borrow();
        let record = registry
            .get(key)
            .ok_or_else(|| WidgetError::MissingInstance(key.clone()))?;
        let buffer = record
            .buffer
            .as_ref()
            .ok_or_else(|| WidgetError::MissingTextBuffer(key.clone()))?;
        let text = buffer.value();
        if text.trim().is_empty() {
            return Err(WidgetError::EmptyText(kind));
        }
        if let Some(busy) = record.state.busy_with() {
            return Err(WidgetError::Busy(busy));
        }
        Ok(text)
    }

    // ----------------------------------------------------------------------
    // Translate
    // ----------------------------------------------------------------------

    /// Translate the widget's text, or restore its cached counterpart.
    pub async fn translate_text(&self, key: &WidgetKey) -> Result<OperationOutcome, WidgetError> {
        let (req, direction, generation) = match self.begin_translate(key) {
            Ok(TranslateStep::Served(outcome)) => return Ok(outcome),
            Ok(TranslateStep::Request {
                req,
                direction,
                generation,
            }) => (req, direction, generation),
            Err(e) => {
                self.report_rejection(key, &e);
                return Err(e);
            }
        };

        self.status.show(key, StatusKind::Loading, MSG_TRANSLATING);
        debug_log!(
            "[{}] translating {} -> {}: {}",
            key,
            req.from_lang,
            req.to_lang,
            preview(&req.text, 30)
        );
        let source = req.text.clone();
        let result = self.backend.translate(req).await;
        self.finish_translate(key, generation, direction, &source, result)
    }

    fn begin_translate(&self, key: &WidgetKey) -> Result<TranslateStep, WidgetError> {
        let text = self.guard(key, OperationKind::Translate)?;

        self.history.borrow_mut().record(key, &text);
        if let Some(record) = self.registry.borrow_mut().get_mut(key) {
            record.current_text = text.clone();
        }

        let cached = self.cache.borrow_mut().lookup(&text);
        if let Some(counterpart) = cached {
            return Ok(TranslateStep::Served(self.restore_from_cache(key, &text, &counterpart)));
        }

        let node_id = key.node_id().to_string();
        let now = (self.clock)();
        if self.throttle.borrow_mut().should_throttle(&node_id, &text, now) {
            return Err(WidgetError::Throttled);
        }

        let direction = detect_direction(&text);
        let generation = self.next_generation();
        if let Some(record) = self.registry.borrow_mut().get_mut(key) {
            record.state = OperationState::Translating { generation };
            record.settled_generation = None;
        }

        Ok(TranslateStep::Request {
            req: TranslateRequest {
                text,
                node_id,
                from_lang: direction.from_lang().to_string(),
                to_lang: direction.to_lang().to_string(),
            },
            direction,
            generation,
        })
    }

    /// Swap in the cached counterpart without a backend call.
    fn restore_from_cache(&self, key: &WidgetKey, current: &str, counterpart: &str) -> OperationOutcome {
        let to_original = {
            let mut registry = self.registry.borrow_mut();
            match registry.get_mut(key) {
                Some(record) if record.original_text.as_deref() == Some(current) => false,
                Some(record) => {
                    record.original_text = Some(counterpart.to_string());
                    true
                }
                None => true,
            }
        };

        self.write_buffer(key, counterpart);
        self.history.borrow_mut().record(key, counterpart);

        let message = if to_original {
            MSG_RESTORED_ORIGINAL
        } else {
            MSG_RESTORED_TRANSLATION
        };
        debug_log!("[{}] restored from cache ({})", key, message);
        self.status.show(key, StatusKind::Restore, message);
        self.emit_buttons(key);

        OperationOutcome::Restored {
            text: counterpart.to_string(),
            to_original,
        }
    }

    fn finish_translate(
        &self,
        key: &WidgetKey,
        generation: u64,
        direction: TranslateDirection,
        source: &str,
        result: Result<TranslateResult, WidgetError>,
    ) -> Result<OperationOutcome, WidgetError> {
        let delivery = {
            let mut registry = self.registry.borrow_mut();
            match registry.get_mut(key) {
                Some(record) if record.state == (OperationState::Translating { generation }) => {
                    record.state = OperationState::Idle;
                    Delivery::Live
                }
                Some(record) if record.settled_generation == Some(generation) => {
                    record.settled_generation = None;
                    if record.state == OperationState::Idle {
                        Delivery::Settled
                    } else {
                        Delivery::Stale
                    }
                }
                _ => Delivery::Stale,
            }
        };

        match (delivery, result) {
            (Delivery::Stale, _) => {
                debug_log!("[{}] dropping stale translate response #{}", key, generation);
                Ok(OperationOutcome::Discarded)
            }
            // The push update already wrote buffer, history and cache.
            (Delivery::Settled, Ok(TranslateResult { text, from_cache })) => {
                debug_log!("[{}] translate #{} already settled by push", key, generation);
                Ok(OperationOutcome::Translated { text, from_cache })
            }
            (Delivery::Settled, Err(e)) => {
                debug_log!("[{}] ignoring failure of settled translate #{}: {}", key, generation, e);
                Ok(OperationOutcome::Discarded)
            }
            (Delivery::Live, Ok(TranslateResult { text, from_cache })) => {
                self.apply_translation_result(key, source, &text);
                let message = completion_message(direction.label(), from_cache);
                self.status.show(key, StatusKind::Success, &message);
                Ok(OperationOutcome::Translated { text, from_cache })
            }
            (Delivery::Live, Err(e)) => {
                self.report_failure(key, OperationKind::Translate, &e);
                Err(e)
            }
        }
    }

    /// Merge a successful translation into cache, buffer and history.
    ///
    /// Safe to call twice with the same pair: the second call records nothing.
    /// Returns whether a new history state was recorded.
    pub fn apply_translation_result(&self, key: &WidgetKey, original: &str, translated: &str) -> bool {
        self.cache.borrow_mut().put(original, translated);

        match self.registry.borrow_mut().get_mut(key) {
            Some(record) => record.original_text = Some(original.to_string()),
            None => return false,
        }

        self.write_buffer(key, translated);
        let recorded = self.history.borrow_mut().record(key, translated);
        self.emit_buttons(key);
        recorded
    }

    // ----------------------------------------------------------------------
    // Expand
    // ----------------------------------------------------------------------

    pub async fn expand_text(&self, key: &WidgetKey) -> Result<OperationOutcome, WidgetError> {
        let (text, generation) = match self.begin_expand(key) {
            Ok(started) => started,
            Err(e) => {
                self.report_rejection(key, &e);
                return Err(e);
            }
        };

        self.status.show(key, StatusKind::Loading, MSG_EXPANDING);
        let req = ExpandRequest {
            text,
            node_id: key.node_id().to_string(),
        };
        let result = self.backend.expand(req).await;

        let current = {
            let mut registry = self.registry.borrow_mut();
            match registry.get_mut(key) {
                Some(record) if record.state == (OperationState::Expanding { generation }) => {
                    record.state = OperationState::Idle;
                    true
                }
                _ => false,
            }
        };
        if !current {
            debug_log!("[{}] dropping stale expand response #{}", key, generation);
            return Ok(OperationOutcome::Discarded);
        }

        match result {
            Ok(expanded) => {
                self.write_buffer(key, &expanded);
                // Expansion may legitimately reproduce an earlier state.
                self.history.borrow_mut().force_record(key, &expanded);
                self.status.show(key, StatusKind::Success, MSG_EXPAND_DONE);
                self.emit_buttons(key);
                Ok(OperationOutcome::Expanded { text: expanded })
            }
            Err(e) => {
                self.report_failure(key, OperationKind::Expand, &e);
                Err(e)
            }
        }
    }

    fn begin_expand(&self, key: &WidgetKey) -> Result<(String, u64), WidgetError> {
        let text = self.guard(key, OperationKind::Expand)?;
        self.history.borrow_mut().record(key, &text);

        let generation = self.next_generation();
        if let Some(record) = self.registry.borrow_mut().get_mut(key) {
            record.current_text = text.clone();
            record.state = OperationState::Expanding { generation };
            record.settled_generation = None;
        }
        Ok((text, generation))
    }

    // ----------------------------------------------------------------------
    // History
    // ----------------------------------------------------------------------

    fn require_history(&self, key: &WidgetKey) -> Result<(), WidgetError> {
        self.flags.borrow().require(Feature::History)?;
        if !self.registry.borrow().has(key) {
            return Err(WidgetError::MissingInstance(key.clone()));
        }
        Ok(())
    }

    /// Step back one state and push it into the input.
    pub fn undo(&self, key: &WidgetKey) -> Result<Option<String>, WidgetError> {
        self.require_history(key)?;
        let text = self.history.borrow_mut().undo(key);
        if let Some(text) = &text {
            self.write_buffer(key, text);
        }
        self.emit_buttons(key);
        Ok(text)
    }

    pub fn redo(&self, key: &WidgetKey) -> Result<Option<String>, WidgetError> {
        self.require_history(key)?;
        let text = self.history.borrow_mut().redo(key);
        if let Some(text) = &text {
            self.write_buffer(key, text);
        }
        self.emit_buttons(key);
        Ok(text)
    }

    /// Record whatever the input holds now (blur).
    pub fn commit_text(&self, key: &WidgetKey) -> Result<bool, WidgetError> {
        self.require_history(key)?;
        let text = self.buffer_of(key)?.value();
        if let Some(record) = self.registry.borrow_mut().get_mut(key) {
            record.current_text = text.clone();
        }
        let recorded = self.history.borrow_mut().record(key, &text);
        if recorded {
            self.emit_buttons(key);
        }
        Ok(recorded)
    }

    /// Merged history rows for the popup of `key`.
    pub fn show_history(&self, key: &WidgetKey) -> Result<Vec<HistoryRecord>, WidgetError> {
        self.require_history(key)?;
        let records = self.history.borrow().merged_records(key);
        if records.is_empty() {
            self.status.show(key, StatusKind::Info, MSG_NO_HISTORY);
        }
        Ok(records)
    }

    /// Write a row picked from the merged view (possibly from another widget
    /// or a deleted node) into `target`.
    pub fn apply_history_item(
        &self,
        target: &WidgetKey,
        source: &WidgetKey,
        text: &str,
    ) -> Result<String, WidgetError> {
        self.require_history(target)?;
        self.buffer_of(target)?;
        debug_log!("[{}] applying history item from {}", target, source);

        self.write_buffer(target, text);
        self.history.borrow_mut().record(target, text);
        self.status.show(target, StatusKind::Success, MSG_RESTORED);
        self.emit_buttons(target);
        Ok(text.to_string())
    }

    pub fn clear_history(&self, key: &WidgetKey) -> Result<(), WidgetError> {
        self.flags.borrow().require(Feature::History)?;
        self.history.borrow_mut().clear(key);
        self.status.show(key, StatusKind::Success, MSG_HISTORY_CLEARED);
        self.emit_buttons(key);
        Ok(())
    }

    /// Drop every widget's history.
    pub fn clear_all_history(&self) {
        self.history.borrow_mut().clear_all();
        let keys = self.registry.borrow().keys();
        for key in &keys {
            self.emit_buttons(key);
        }
    }

    // ----------------------------------------------------------------------
    // Presets
    // ----------------------------------------------------------------------

    pub fn apply_preset(&self, key: &WidgetKey, content: &str) -> Result<Option<String>, WidgetError> {
        self.flags.borrow().require(Feature::Preset)?;
        let buffer = self.buffer_of(key)?;

        match presets::apply(&buffer.value(), content, buffer.cursor()) {
            PresetEdit::AlreadyPresent => {
                self.status.show(key, StatusKind::Info, MSG_PRESET_EXISTS);
                Ok(None)
            }
            PresetEdit::Applied { text, cursor } => {
                self.write_buffer(key, &text);
                if let Some(pos) = cursor {
                    buffer.set_cursor(pos);
                }
                self.history.borrow_mut().record(key, &text);
                self.status.show(key, StatusKind::Success, MSG_PRESET_APPLIED);
                self.emit_buttons(key);
                Ok(Some(text))
            }
        }
    }

    pub fn remove_preset(&self, key: &WidgetKey, content: &str) -> Result<Option<String>, WidgetError> {
        self.flags.borrow().require(Feature::Preset)?;
        let buffer = self.buffer_of(key)?;

        match presets::remove(&buffer.value(), content) {
            PresetRemoval::NotPresent => {
                self.status.show(key, StatusKind::Info, MSG_PRESET_NOT_FOUND);
                Ok(None)
            }
            PresetRemoval::Removed(text) => {
                self.write_buffer(key, &text);
                self.history.borrow_mut().record(key, &text);
                self.status.show(key, StatusKind::Success, MSG_PRESET_REMOVED);
                self.emit_buttons(key);
                Ok(Some(text))
            }
        }
    }

    /// Preset list, fetched once and cached until invalidated.
    pub async fn load_presets(&self, key: Option<&WidgetKey>) -> Result<Vec<Preset>, WidgetError> {
        let cached = self.presets.borrow().clone();
        let list = match cached {
            Some(list) => list,
            None => {
                let list = self.backend.load_presets().await?;
                debug_log!("loaded {} presets", list.len());
                *self.presets.borrow_mut() = Some(list.clone());
                list
            }
        };
        if list.is_empty() {
            match key {
                Some(key) => self.status.show(key, StatusKind::Info, MSG_NO_PRESETS),
                None => self.status.notify(StatusKind::Info, MSG_NO_PRESETS),
            }
        }
        Ok(list)
    }

    pub async fn show_presets(&self, key: &WidgetKey) -> Result<Vec<Preset>, WidgetError> {
        self.flags.borrow().require(Feature::Preset)?;
        self.load_presets(Some(key)).await.inspect_err(|e| {
            self.status.show(key, StatusKind::Error, &e.to_string());
        })
    }

    pub async fn save_presets(&self, presets: Vec<Preset>) -> Result<(), WidgetError> {
        self.backend.save_presets(presets).await?;
        self.invalidate_presets();
        Ok(())
    }

    pub fn invalidate_presets(&self) {
        *self.presets.borrow_mut() = None;
    }

    pub fn cached_presets(&self) -> Option<Vec<Preset>> {
        self.presets.borrow().clone()
    }

    // ----------------------------------------------------------------------
    // Backend configuration
    // ----------------------------------------------------------------------

    pub async fn load_config(&self) -> Result<WidgetConfig, WidgetError> {
        self.backend.load_config().await
    }

    pub async fn save_config(&self, config: WidgetConfig) -> Result<(), WidgetError> {
        self.backend.save_config(config).await
    }

    pub async fn set_backend_debug(&self, debug: bool) -> Result<(), WidgetError> {
        self.backend.set_debug(debug).await.inspect_err(|e| {
            log::error!("failed to set backend debug mode: {}", e);
        })
    }

    /// Drop cached presets and fetch them again.
    pub async fn reload_config(&self) -> Result<(), WidgetError> {
        self.invalidate_presets();
        self.load_presets(None).await.map(|_| ())
    }

    // ----------------------------------------------------------------------
    // Push channel
    // ----------------------------------------------------------------------

    pub async fn handle_push_event(&self, event: PushEvent) -> Result<(), WidgetError> {
        match event {
            PushEvent::TranslateUpdate(update) => {
                self.apply_push_update(&update);
                Ok(())
            }
            PushEvent::ConfigUpdate(update) => self.apply_config_update(update).await,
        }
    }

    async fn apply_config_update(&self, update: ConfigUpdate) -> Result<(), WidgetError> {
        if update.status != "success" {
            log::warn!(
                "config update failed: {}",
                update.message.as_deref().unwrap_or("unknown error")
            );
            return Ok(());
        }
        if update.config.is_none() {
            return Ok(());
        }
        self.reload_config().await?;
        self.status.notify(StatusKind::Success, MSG_CONFIG_UPDATED);
        Ok(())
    }

    /// Pick the widget a node-keyed push update belongs to.
    pub fn route_push(&self, node_id: &str, original_text: Option<&str>) -> Option<WidgetKey> {
        let registry = self.registry.borrow();
        let keys = registry.keys_for_node(node_id);

        let translating = keys
            .iter()
            .find(|k| registry.get(k).is_some_and(|r| r.is_translating()));
        if let Some(key) = translating {
            return Some(key.clone());
        }
        if let Some(original) = original_text {
            let holder = keys
                .iter()
                .find(|k| registry.get(k).is_some_and(|r| r.text() == original));
            if let Some(key) = holder {
                return Some(key.clone());
            }
        }
        match keys.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        }
    }

    /// Apply one `prompt_translate_update`. Returns whether it touched a widget.
    pub fn apply_push_update(&self, update: &TranslateUpdate) -> bool {
        let Some(key) = self.route_push(&update.node_id, update.original_text.as_deref()) else {
            log::warn!("no widget instance for node {}", update.node_id);
            return false;
        };

        match update.status {
            UpdateStatus::Translating => {
                let Some(progress) = update.progress else {
                    return false;
                };
                self.throttle
                    .borrow_mut()
                    .touch(&update.node_id, (self.clock)());
                let message = format!("Translating {}/{}...", progress.current, progress.total);
                self.status.show(&key, StatusKind::Loading, &message);
                true
            }
            UpdateStatus::Error => {
                let Some(message) = update.message.as_deref() else {
                    return false;
                };
                log::error!("[{}] translation error: {}", key, message);
                self.settle_translating(&key);
                self.status.show(&key, StatusKind::Error, message);
                true
            }
            UpdateStatus::Success => {
                let (Some(translated), Some(original)) =
                    (update.translated_text.as_deref(), update.original_text.as_deref())
                else {
                    return false;
                };
                self.settle_translating(&key);
                self.apply_translation_result(&key, original, translated);

                if update.is_restore() {
                    if update.operation_desc.as_deref() == Some(RESTORE_ORIGINAL_DESC) {
                        if let Some(record) = self.registry.borrow_mut().get_mut(&key) {
                            record.original_text = Some(translated.to_string());
                        }
                    }
                    let message = update.operation_desc.as_deref().unwrap_or(MSG_RESTORED);
                    self.status.show(&key, StatusKind::Restore, message);
                } else {
                    let message = match update.translate_direction.as_deref() {
                        Some(direction) => {
                            completion_message(direction, update.from_cache.unwrap_or(false))
                        }
                        None => MSG_TRANSLATE_DONE.to_string(),
                    };
                    self.status.show(&key, StatusKind::Success, &message);
                }
                true
            }
            UpdateStatus::Unknown => false,
        }
    }

    /// Clear a pending translate busy flag on behalf of a push update and
    /// remember which request it settled.
    fn settle_translating(&self, key: &WidgetKey) {
        if let Some(record) = self.registry.borrow_mut().get_mut(key) {
            if let OperationState::Translating { generation } = record.state {
                record.state = OperationState::Idle;
                record.settled_generation = Some(generation);
            }
        }
    }

    // ----------------------------------------------------------------------
    // Lifecycle
    // ----------------------------------------------------------------------

    /// Destroy every instance and drop cached presets. History is kept.
    pub fn destroy_all(&self) -> usize {
        let removed = self.registry.borrow_mut().clear_all();
        self.invalidate_presets();
        removed
    }
}

/// `zh->en complete (cached)`
fn completion_message(direction: &str, from_cache: bool) -> String {
    format!(
        "{} complete{}",
        direction,
        if from_cache { " (cached)" } else { "" }
    )
}
