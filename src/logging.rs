//! `log` backend that writes to the browser console.
//!
//! Installed once from the wasm entry point. Native builds (tests, headless
//! hosts) never install it, so log calls there are no-ops.

use log::{Level, LevelFilter, Log, Metadata, Record};

const PREFIX: &str = "[PromptWidget]";

pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = wasm_bindgen::JsValue::from_str(&format!("{} {}", PREFIX, record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::log_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Level used when the frontend debug toggle is off.
pub fn default_level() -> LevelFilter {
    LevelFilter::Warn
}

pub fn level_for(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        default_level()
    }
}

/// Install the console logger and the panic hook. Safe to call twice.
pub fn init(debug: bool) {
    console_error_panic_hook::set_once();
    if log::set_logger(&LOGGER).is_err() {
        debug_log!("console logger already installed");
    }
    set_debug(debug);
}

/// Frontend debug toggle.
pub fn set_debug(debug: bool) {
    log::set_max_level(level_for(debug));
}
