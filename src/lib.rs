use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::HtmlTextAreaElement;

#[macro_use]
mod macros;

pub mod constants;
pub mod coordinator;
pub mod dom;
pub mod errors;
pub mod history;
pub mod language;
pub mod logging;
pub mod messages;
pub mod models;
pub mod network;
pub mod presets;
pub mod registry;
pub mod settings;
pub mod state;
pub mod sweeper;
pub mod throttle;
pub mod toast;
pub mod translation_cache;
pub mod update;
pub mod utils;

use constants::EVENT_CONFIG_UPDATE;
use coordinator::OperationCoordinator;
use dom::{JsHostGraph, ListenerGuard, SweepTimer, TextAreaBuffer};
use messages::{ActionOutcome, OperationOutcome, WidgetAction};
use models::{Preset, WidgetConfig, WidgetKey};
use network::event_router::EventHandler;
use network::messages::PushEvent;
use network::ApiClient;
use settings::{SettingChange, SettingEffect};
use state::WidgetServices;
use toast::DomStatusSink;

/// Browser entry point. The host extension creates one per page and feeds it
/// node lifecycle, button clicks, settings changes and push events.
#[wasm_bindgen]
pub struct PromptWidget {
    services: Rc<WidgetServices>,
    activity: Option<ListenerGuard>,
    timer: RefCell<Option<SweepTimer>>,
}

#[wasm_bindgen]
impl PromptWidget {
    /// `node_exists(node_id) -> bool` answers for the host graph;
    /// `on_buttons(widget_key, has_past, has_future)` receives undo/redo state.
    #[wasm_bindgen(constructor)]
    pub fn new(
        node_exists: js_sys::Function,
        on_buttons: Option<js_sys::Function>,
        debug: bool,
    ) -> PromptWidget {
        logging::init(debug);

        // A URL set through `init_api_config_js` wins over the build-time one.
        if network::get_api_base_url().is_empty() {
            if let Err(e) = network::init_api_config() {
                debug_log!("{}; using same-origin routes", e);
            }
        }

        let services = Rc::new(WidgetServices::new(
            Rc::new(ApiClient::new()),
            Rc::new(DomStatusSink::new(on_buttons)),
            Rc::new(JsHostGraph::new(node_exists)),
        ));
        services.coordinator().flags_mut().debug_frontend = debug;
        services
            .router()
            .borrow_mut()
            .subscribe(EVENT_CONFIG_UPDATE, config_update_handler(services.coordinator()));

        let activity = match dom::listen_for_activity(Rc::downgrade(&services)) {
            Ok(guard) => Some(guard),
            Err(e) => {
                log::warn!("activity tracking unavailable: {:?}", e);
                None
            }
        };

        let widget = PromptWidget {
            services,
            activity,
            timer: RefCell::new(None),
        };
        widget.restart_timer();
        widget
    }

    /// Attach a widget to a node's prompt textarea. Returns the widget key.
    pub fn attach(
        &self,
        node_id: &str,
        input_id: &str,
        textarea: HtmlTextAreaElement,
    ) -> Result<String, JsValue> {
        let blur_key = WidgetKey::new(node_id, input_id);
        let coordinator = Rc::downgrade(self.services.coordinator());
        let blur = dom::listen_for_blur(&textarea, move || {
            let Some(coordinator) = coordinator.upgrade() else {
                return;
            };
            if let Err(e) = coordinator.commit_text(&blur_key) {
                debug_log!("[{}] blur not recorded: {}", blur_key, e);
            }
        })?;

        let buffer = Rc::new(TextAreaBuffer::new(textarea));
        let key = self
            .services
            .attach(node_id, input_id, buffer, Some(blur.into_teardown()))?;
        Ok(key.as_str().to_string())
    }

    /// Run a button action by tag (`translate`, `expand`, `undo`, ...).
    pub fn action(&self, key: &str, tag: &str) -> Promise {
        match tag.parse::<WidgetAction>() {
            Ok(action) => self.run(WidgetKey::from_raw(key), action),
            Err(e) => Promise::reject(&JsValue::from_str(&e.to_string())),
        }
    }

    pub fn apply_preset(&self, key: &str, content: String) -> Promise {
        self.run(WidgetKey::from_raw(key), WidgetAction::ApplyPreset(content))
    }

    pub fn remove_preset(&self, key: &str, content: String) -> Promise {
        self.run(WidgetKey::from_raw(key), WidgetAction::RemovePreset(content))
    }

    /// Apply a row of the merged history view, which may come from another widget.
    pub fn apply_history_item(&self, key: &str, source_key: &str, text: String) -> Promise {
        self.run(
            WidgetKey::from_raw(key),
            WidgetAction::ApplyHistoryItem {
                source: WidgetKey::from_raw(source_key),
                text,
            },
        )
    }

    pub fn clear_all_history(&self) {
        self.services.coordinator().clear_all_history();
    }

    /// Push-channel event from the host (`prompt_translate_update`, ...).
    pub fn handle_event(&self, name: &str, detail: JsValue) -> Result<u32, JsValue> {
        let payload: serde_json::Value = serde_wasm_bindgen::from_value(detail)?;
        Ok(self.services.route_event(name, payload) as u32)
    }

    pub fn node_removed(&self, node_id: &str) -> u32 {
        self.services.node_removed(node_id) as u32
    }

    pub fn node_deselected(&self, node_id: &str) -> u32 {
        self.services.node_deselected(node_id) as u32
    }

    /// Settings panel change. Resolves to whether the change took effect;
    /// rejects when the backend refused a debug toggle so the host can revert it.
    pub fn set_setting(&self, id: &str, value: JsValue) -> Promise {
        let value: serde_json::Value = match serde_wasm_bindgen::from_value(value) {
            Ok(v) => v,
            Err(e) => return Promise::reject(&e.into()),
        };
        let Some(change) = SettingChange::parse(id, &value) else {
            log::warn!("ignoring unknown setting {} = {}", id, value);
            return Promise::resolve(&JsValue::FALSE);
        };

        match self.services.apply_setting(change) {
            SettingEffect::Startup | SettingEffect::IntervalChanged(_) => self.restart_timer(),
            SettingEffect::Shutdown { .. } => self.stop_timer(),
            SettingEffect::Refused => return Promise::resolve(&JsValue::FALSE),
            SettingEffect::BackendDebug(on) => {
                let coordinator = self.services.coordinator().clone();
                return future_to_promise(async move {
                    coordinator.set_backend_debug(on).await?;
                    Ok(JsValue::TRUE)
                });
            }
            SettingEffect::FrontendDebug(_) | SettingEffect::Nothing => {}
        }
        Promise::resolve(&JsValue::TRUE)
    }

    pub fn load_presets(&self) -> Promise {
        let coordinator = self.services.coordinator().clone();
        future_to_promise(async move {
            let presets = coordinator.load_presets(None).await?;
            Ok(serde_wasm_bindgen::to_value(&presets)?)
        })
    }

    pub fn save_presets(&self, presets: JsValue) -> Promise {
        let presets: Vec<Preset> = match serde_wasm_bindgen::from_value(presets) {
            Ok(p) => p,
            Err(e) => return Promise::reject(&e.into()),
        };
        let coordinator = self.services.coordinator().clone();
        future_to_promise(async move {
            coordinator.save_presets(presets).await?;
            Ok(JsValue::TRUE)
        })
    }

    pub fn load_config(&self) -> Promise {
        let coordinator = self.services.coordinator().clone();
        future_to_promise(async move {
            let config = coordinator.load_config().await?;
            Ok(serde_wasm_bindgen::to_value(&config)?)
        })
    }

    pub fn save_config(&self, config: JsValue) -> Promise {
        let config: WidgetConfig = match serde_wasm_bindgen::from_value(config) {
            Ok(c) => c,
            Err(e) => return Promise::reject(&e.into()),
        };
        let coordinator = self.services.coordinator().clone();
        future_to_promise(async move {
            coordinator.save_config(config).await?;
            Ok(JsValue::TRUE)
        })
    }

    /// Extension unload: stop timers and listeners, destroy every widget.
    pub fn unload(&mut self) {
        self.stop_timer();
        self.activity = None;
        self.services.teardown();
    }
}

impl PromptWidget {
    fn run(&self, key: WidgetKey, action: WidgetAction) -> Promise {
        let coordinator = self.services.coordinator().clone();
        future_to_promise(async move {
            let outcome = update::dispatch(&coordinator, &key, action).await?;
            outcome_to_js(outcome)
        })
    }

    fn restart_timer(&self) {
        self.stop_timer();
        let (enabled, period) = {
            let flags = self.services.coordinator().flags();
            (flags.enabled, flags.cleanup_interval_secs)
        };
        if enabled {
            let timer = SweepTimer::start(Rc::downgrade(&self.services), period);
            *self.timer.borrow_mut() = Some(timer);
        }
    }

    fn stop_timer(&self) {
        if let Some(timer) = self.timer.borrow_mut().take() {
            debug_log!("sweep timer stopped ({}s)", timer.period_secs());
        }
    }
}

fn outcome_to_js(outcome: ActionOutcome) -> Result<JsValue, JsValue> {
    let value = match outcome {
        ActionOutcome::Operation(
            OperationOutcome::Translated { text, .. }
            | OperationOutcome::Restored { text, .. }
            | OperationOutcome::Expanded { text },
        )
        | ActionOutcome::Text(Some(text)) => JsValue::from_str(&text),
        ActionOutcome::Operation(OperationOutcome::Discarded)
        | ActionOutcome::Text(None)
        | ActionOutcome::Done => JsValue::NULL,
        ActionOutcome::History(records) => serde_wasm_bindgen::to_value(&records)?,
        ActionOutcome::Presets(presets) => serde_wasm_bindgen::to_value(&presets)?,
    };
    Ok(value)
}

/// Config pushes need a backend round trip, so they run on the local executor.
fn config_update_handler(coordinator: &Rc<OperationCoordinator>) -> EventHandler {
    let weak = Rc::downgrade(coordinator);
    Rc::new(RefCell::new(move |payload: serde_json::Value| {
        let Some(coordinator) = weak.upgrade() else {
            return;
        };
        let event = match PushEvent::parse(EVENT_CONFIG_UPDATE, payload) {
            Ok(Some(event)) => event,
            Ok(None) => return,
            Err(e) => {
                log::error!("invalid {} payload: {}", EVENT_CONFIG_UPDATE, e);
                return;
            }
        };
        spawn_local(async move {
            if let Err(e) = coordinator.handle_push_event(event).await {
                log::error!("failed to reload widget configuration: {}", e);
            }
        });
    }))
}
