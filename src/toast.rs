//! Transient status tips for widget operations.
//!
//! The coordinator reports through [`StatusSink`]. In the browser
//! [`DomStatusSink`] creates a `#prompt-widget-toast-root` container once per
//! page and appends toast divs that fade out after a few seconds; headless
//! hosts use [`LogStatusSink`].

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, Element};

use crate::messages::{ButtonState, StatusKind};
use crate::models::WidgetKey;

pub trait StatusSink {
    fn show(&self, key: &WidgetKey, kind: StatusKind, message: &str);

    /// Page-level notice not tied to one widget.
    fn notify(&self, kind: StatusKind, message: &str);

    /// Undo/redo availability changed for `key`.
    fn buttons_changed(&self, _key: &WidgetKey, _state: ButtonState) {}
}

/// Writes status tips to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn show(&self, key: &WidgetKey, kind: StatusKind, message: &str) {
        match kind {
            StatusKind::Error => log::warn!("[{}] {}", key, message),
            _ => log::info!("[{}] {}: {}", key, kind.as_str(), message),
        }
    }

    fn notify(&self, kind: StatusKind, message: &str) {
        log::info!("{}: {}", kind.as_str(), message);
    }

    fn buttons_changed(&self, key: &WidgetKey, state: ButtonState) {
        debug_log!(
            "[{}] undo={} redo={}",
            key,
            state.has_past,
            state.has_future
        );
    }
}

const TOAST_LIFETIME_MS: i32 = 2000;

/// Renders status tips as toasts and forwards button state to a host callback
/// `(widget_key, has_past, has_future)`.
#[derive(Default)]
pub struct DomStatusSink {
    on_buttons: Option<js_sys::Function>,
}

impl DomStatusSink {
    pub fn new(on_buttons: Option<js_sys::Function>) -> Self {
        Self { on_buttons }
    }
}

impl StatusSink for DomStatusSink {
    fn show(&self, key: &WidgetKey, kind: StatusKind, message: &str) {
        if let Err(e) = show(Some(key), kind, message) {
            log::warn!("failed to render status tip: {:?}", e);
        }
    }

    fn notify(&self, kind: StatusKind, message: &str) {
        if let Err(e) = show(None, kind, message) {
            log::warn!("failed to render notice: {:?}", e);
        }
    }

    fn buttons_changed(&self, key: &WidgetKey, state: ButtonState) {
        if let Some(cb) = &self.on_buttons {
            let _ = cb.call3(
                &JsValue::NULL,
                &JsValue::from_str(key.as_str()),
                &JsValue::from_bool(state.has_past),
                &JsValue::from_bool(state.has_future),
            );
        }
    }
}

fn show(key: Option<&WidgetKey>, kind: StatusKind, message: &str) -> Result<(), JsValue> {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return Ok(()),
    };
    let document = match window.document() {
        Some(d) => d,
        None => return Ok(()),
    };

    let root = ensure_root(&document)?;

    // One live tip per widget.
    if let Some(key) = key {
        if let Some(old) = root.query_selector(&tip_selector(key))? {
            old.remove();
        }
    }

    let toast = document.create_element("div")?;
    toast.set_class_name("pw-toast");
    toast
        .class_list()
        .add_1(&format!("pw-toast-{}", kind.as_str()))?;
    if let Some(key) = key {
        toast.set_attribute("data-widget", key.as_str())?;
    }
    toast.set_text_content(Some(message));

    // Prepend so newest appears on top.
    root.prepend_with_node_1(&toast)?;

    // Loading tips stay until the operation reports back.
    if kind != StatusKind::Loading {
        let doomed = toast.clone();
        let cb = Closure::once_into_js(move || doomed.remove());
        window.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            TOAST_LIFETIME_MS,
        )?;
    }

    ensure_styles(&document)
}

/// Selector for the live tip of `key`. Keys come from host node and input
/// ids, so quotes and backslashes are escaped inside the attribute string.
fn tip_selector(key: &WidgetKey) -> String {
    let mut escaped = String::with_capacity(key.as_str().len());
    for c in key.as_str().chars() {
        match c {
            '"' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            // Newlines cannot appear raw in a CSS string.
            '\n' => escaped.push_str("\\a "),
            _ => escaped.push(c),
        }
    }
    format!(".pw-toast[data-widget=\"{}\"]", escaped)
}

fn ensure_root(document: &Document) -> Result<Element, JsValue> {
    if let Some(el) = document.get_element_by_id("prompt-widget-toast-root") {
        return Ok(el);
    }
    let root = document.create_element("div")?;
    root.set_id("prompt-widget-toast-root");
    root.set_class_name("pw-toast-root");
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;
    body.append_child(&root)?;
    Ok(root)
}

fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.get_element_by_id("prompt-widget-toast-styles").is_some() {
        return Ok(());
    }

    let css = "
.pw-toast-root{position:fixed;bottom:16px;right:16px;display:flex;flex-direction:column;gap:6px;z-index:9999;font-family:Arial,Helvetica,sans-serif;font-size:12px}
.pw-toast{padding:6px 12px;border-radius:4px;color:#fff;box-shadow:0 2px 4px rgba(0,0,0,.2);opacity:0;animation:pw-toast-in .2s forwards}
.pw-toast-success{background:#16a34a}
.pw-toast-error{background:#dc2626}
.pw-toast-info{background:#2563eb}
.pw-toast-loading{background:#4b5563}
.pw-toast-restore{background:#7c3aed}
@keyframes pw-toast-in{to{opacity:1}}
";

    let style = document.create_element("style")?;
    style.set_id("prompt-widget-toast-styles");
    style.set_text_content(Some(css));
    match document.query_selector("head")? {
        Some(head) => head.append_child(&style)?,
        None => document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?
            .append_child(&style)?,
    };
    Ok(())
}
