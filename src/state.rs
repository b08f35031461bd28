// src/state.rs
//
// Service object owning every store of the widget core. Built once per page
// session and torn down explicitly when the extension unloads.
//
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::constants::EVENT_TRANSLATE_UPDATE;
use crate::coordinator::OperationCoordinator;
use crate::errors::WidgetError;
use crate::models::WidgetKey;
use crate::network::event_router::EventHandler;
use crate::network::messages::PushEvent;
use crate::network::{EventRouter, PromptBackend};
use crate::registry::{HostGraph, InstanceRecord, Teardown, TextBuffer};
use crate::settings::{SettingChange, SettingEffect};
use crate::sweeper::ReclamationSweeper;
use crate::toast::StatusSink;

pub struct WidgetServices {
    coordinator: Rc<OperationCoordinator>,
    sweeper: ReclamationSweeper,
    router: Rc<RefCell<EventRouter>>,
}

impl WidgetServices {
    pub fn new(
        backend: Rc<dyn PromptBackend>,
        status: Rc<dyn StatusSink>,
        host: Rc<dyn HostGraph>,
    ) -> Self {
        Self::with_coordinator(Rc::new(OperationCoordinator::new(backend, status)), host)
    }

    pub fn with_coordinator(coordinator: Rc<OperationCoordinator>, host: Rc<dyn HostGraph>) -> Self {
        let sweeper = ReclamationSweeper::new(coordinator.clone(), host);
        let router = Rc::new(RefCell::new(EventRouter::new()));
        router
            .borrow_mut()
            .subscribe(EVENT_TRANSLATE_UPDATE, translate_update_handler(&coordinator));
        Self {
            coordinator,
            sweeper,
            router,
        }
    }

    pub fn coordinator(&self) -> &Rc<OperationCoordinator> {
        &self.coordinator
    }

    pub fn sweeper(&self) -> &ReclamationSweeper {
        &self.sweeper
    }

    pub fn router(&self) -> &Rc<RefCell<EventRouter>> {
        &self.router
    }

    /// Attach a widget to `input_id` of `node_id`.
    ///
    /// A live record backed by the same input is reused; anything else under
    /// the key is torn down and replaced, and history is seeded with the
    /// input's current text.
    pub fn attach(
        &self,
        node_id: &str,
        input_id: &str,
        buffer: Rc<dyn TextBuffer>,
        teardown: Option<Teardown>,
    ) -> Result<WidgetKey, WidgetError> {
        if !self.coordinator.flags().enabled {
            if let Some(teardown) = teardown {
                teardown();
            }
            return Err(WidgetError::FeatureDisabled("prompt widget"));
        }

        let key = WidgetKey::new(node_id, input_id);
        let reusable = self
            .coordinator
            .registry()
            .get(&key)
            .and_then(|r| r.buffer.as_ref().map(|b| b.same_target(buffer.as_ref())))
            .unwrap_or(false);
        if reusable {
            if let Some(teardown) = teardown {
                teardown();
            }
            return Ok(key);
        }

        let text = buffer.value();
        let mut record = InstanceRecord::new(node_id, input_id, Some(buffer));
        if let Some(teardown) = teardown {
            record = record.with_teardown(teardown);
        }
        self.coordinator.registry_mut().add(record);
        {
            let mut history = self.coordinator.history_mut();
            history.init_or_clear(&key, false);
            history.record(&key, &text);
        }
        debug_log!("attached widget {}", key);
        self.coordinator.emit_buttons(&key);
        Ok(key)
    }

    /// Host deleted a node: sweep immediately.
    pub fn node_removed(&self, node_id: &str) -> usize {
        debug_log!("node removed: {}", node_id);
        self.sweeper.on_node_removed()
    }

    /// Host deselected a node: drop its widgets that never held any text.
    pub fn node_deselected(&self, node_id: &str) -> usize {
        if !self.coordinator.flags().enabled {
            return 0;
        }
        let empty: Vec<WidgetKey> = {
            let registry = self.coordinator.registry();
            let history = self.coordinator.history();
            registry
                .keys_for_node(node_id)
                .into_iter()
                .filter(|k| registry.is_empty(k, &history))
                .collect()
        };
        let mut registry = self.coordinator.registry_mut();
        let mut removed = 0;
        for key in &empty {
            if registry.remove(key) {
                removed += 1;
            }
        }
        removed
    }

    pub fn note_activity(&self, now_ms: i64) {
        self.sweeper.activity().note_activity(now_ms);
    }

    /// Periodic timer tick.
    pub fn tick(&self, now_ms: i64) -> Option<usize> {
        self.sweeper.on_tick(now_ms)
    }

    /// Apply a settings-panel change and carry out its local side effects.
    /// Backend debug and timer (re)scheduling are left to the caller.
    pub fn apply_setting(&self, change: SettingChange) -> SettingEffect {
        let effect = self.coordinator.flags_mut().apply(change);
        match effect {
            SettingEffect::Shutdown { auto } => {
                let removed = self.coordinator.destroy_all();
                log::info!(
                    "prompt widget disabled{}, {} instances destroyed",
                    if auto { " (all features off)" } else { "" },
                    removed
                );
            }
            SettingEffect::Refused => {
                log::warn!("cannot enable prompt widget: every feature is disabled");
            }
            SettingEffect::FrontendDebug(on) => crate::logging::set_debug(on),
            SettingEffect::Startup
            | SettingEffect::BackendDebug(_)
            | SettingEffect::IntervalChanged(_)
            | SettingEffect::Nothing => {}
        }
        effect
    }

    /// Route a push-channel event to its subscribers.
    pub fn route_event(&self, name: &str, payload: serde_json::Value) -> usize {
        EventRouter::route(&self.router, name, payload)
    }

    /// Extension unload: destroy every instance and drop the subscriptions.
    pub fn teardown(&self) {
        let removed = self.coordinator.destroy_all();
        self.router.borrow_mut().clear();
        debug_log!("prompt widget unloaded, {} instances destroyed", removed);
    }
}

fn translate_update_handler(coordinator: &Rc<OperationCoordinator>) -> EventHandler {
    let weak: Weak<OperationCoordinator> = Rc::downgrade(coordinator);
    Rc::new(RefCell::new(move |payload: serde_json::Value| {
        let Some(coordinator) = weak.upgrade() else {
            return;
        };
        match PushEvent::parse(EVENT_TRANSLATE_UPDATE, payload) {
            Ok(Some(PushEvent::TranslateUpdate(update))) => {
                coordinator.apply_push_update(&update);
            }
            Ok(_) => {}
            Err(e) => log::error!("invalid {} payload: {}", EVENT_TRANSLATE_UPDATE, e),
        }
    }))
}
