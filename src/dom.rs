//! Browser bindings for the widget core: the textarea buffer, the host graph
//! callback, document listeners and the reclamation timer.
//!
//! Everything in here talks to `web_sys` and only runs under wasm.

use std::any::Any;
use std::rc::Weak;

use gloo_timers::callback::Interval;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Event, EventInit, EventTarget, HtmlTextAreaElement};

use crate::registry::{HostGraph, Teardown, TextBuffer};
use crate::state::WidgetServices;
use crate::utils::now_ms;

// ---------------------------------------------------------------------------
// Textarea
// ---------------------------------------------------------------------------

/// The prompt textarea of a node.
pub struct TextAreaBuffer {
    element: HtmlTextAreaElement,
}

impl TextAreaBuffer {
    pub fn new(element: HtmlTextAreaElement) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &HtmlTextAreaElement {
        &self.element
    }
}

impl TextBuffer for TextAreaBuffer {
    fn value(&self) -> String {
        self.element.value()
    }

    /// Writes the value and fires a bubbling `input` event so the host picks
    /// the change up as if the user had typed it.
    fn set_value(&self, text: &str) {
        self.element.set_value(text);
        let init = EventInit::new();
        init.set_bubbles(true);
        match Event::new_with_event_init_dict("input", &init) {
            Ok(event) => {
                if let Err(e) = self.element.dispatch_event(&event) {
                    log::warn!("failed to dispatch input event: {:?}", e);
                }
            }
            Err(e) => log::warn!("failed to create input event: {:?}", e),
        }
    }

    fn cursor(&self) -> Option<usize> {
        self.element
            .selection_start()
            .ok()
            .flatten()
            .map(|pos| pos as usize)
    }

    fn set_cursor(&self, pos: usize) {
        let pos = pos as u32;
        if let Err(e) = self.element.set_selection_range(pos, pos) {
            log::warn!("failed to move cursor: {:?}", e);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn same_target(&self, other: &dyn TextBuffer) -> bool {
        other
            .as_any()
            .downcast_ref::<TextAreaBuffer>()
            .is_some_and(|o| o.element == self.element)
    }
}

// ---------------------------------------------------------------------------
// Host graph
// ---------------------------------------------------------------------------

/// Host callback `(node_id) => boolean` answering whether a node still exists.
pub struct JsHostGraph {
    node_exists: js_sys::Function,
}

impl JsHostGraph {
    pub fn new(node_exists: js_sys::Function) -> Self {
        Self { node_exists }
    }
}

impl HostGraph for JsHostGraph {
    fn node_exists(&self, node_id: &str) -> bool {
        // A failing callback must not get live widgets reclaimed.
        match self
            .node_exists
            .call1(&JsValue::NULL, &JsValue::from_str(node_id))
        {
            Ok(v) => v.as_bool().unwrap_or(true),
            Err(e) => {
                log::warn!("node lookup failed for {}: {:?}", node_id, e);
                true
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// Event listeners removed again when the guard is dropped.
pub struct ListenerGuard {
    target: EventTarget,
    events: Vec<&'static str>,
    callback: Closure<dyn FnMut(Event)>,
}

impl ListenerGuard {
    pub fn listen(
        target: EventTarget,
        events: &[&'static str],
        passive: bool,
        callback: Closure<dyn FnMut(Event)>,
    ) -> Result<Self, JsValue> {
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        for event in events {
            target.add_event_listener_with_callback_and_add_event_listener_options(
                event,
                callback.as_ref().unchecked_ref(),
                &options,
            )?;
        }
        Ok(Self {
            target,
            events: events.to_vec(),
            callback,
        })
    }

    /// Hand the guard to an instance record; the listeners go with it.
    pub fn into_teardown(self) -> Teardown {
        Box::new(move || drop(self))
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        for event in &self.events {
            let _ = self
                .target
                .remove_event_listener_with_callback(event, self.callback.as_ref().unchecked_ref());
        }
    }
}

/// Mouse, key and click activity on the document postpones timer sweeps.
pub fn listen_for_activity(services: Weak<WidgetServices>) -> Result<ListenerGuard, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document available"))?;

    let callback = Closure::wrap(Box::new(move |_: Event| {
        if let Some(services) = services.upgrade() {
            services.note_activity(now_ms());
        }
    }) as Box<dyn FnMut(Event)>);

    ListenerGuard::listen(document.into(), &["mousemove", "keydown", "click"], true, callback)
}

/// Record the textarea's text into history whenever it loses focus.
pub fn listen_for_blur(
    element: &HtmlTextAreaElement,
    mut on_blur: impl FnMut() + 'static,
) -> Result<ListenerGuard, JsValue> {
    let callback = Closure::wrap(Box::new(move |_: Event| on_blur()) as Box<dyn FnMut(Event)>);
    ListenerGuard::listen(element.clone().into(), &["blur"], false, callback)
}

// ---------------------------------------------------------------------------
// Reclamation timer
// ---------------------------------------------------------------------------

/// Periodic sweep. Dropping the timer cancels it.
pub struct SweepTimer {
    _interval: Interval,
    period_secs: u32,
}

impl SweepTimer {
    pub fn start(services: Weak<WidgetServices>, period_secs: u32) -> Self {
        let interval = Interval::new(period_secs.saturating_mul(1000), move || {
            let Some(services) = services.upgrade() else {
                return;
            };
            if let Some(removed) = services.tick(now_ms()) {
                debug_log!("timer sweep reclaimed {} instances", removed);
            }
        });
        debug_log!("sweep timer started, every {}s", period_secs);
        Self {
            _interval: interval,
            period_secs,
        }
    }

    pub fn period_secs(&self) -> u32 {
        self.period_secs
    }
}
