// Re-export network modules
pub mod api_client;
pub mod config;
pub mod event_router;
pub mod messages;

// Re-export commonly used items
pub use api_client::ApiClient;
pub use event_router::EventRouter;

use config::ApiConfig;
use futures::future::LocalBoxFuture;
use lazy_static::lazy_static;
use std::sync::RwLock;
use wasm_bindgen::prelude::*;

use crate::errors::WidgetError;
use crate::models::{Preset, WidgetConfig};
use crate::network::messages::{ExpandRequest, TranslateRequest, TranslateResult};

lazy_static! {
    static ref API_CONFIG: RwLock<Option<ApiConfig>> = RwLock::new(None);
}

fn store_config(config: ApiConfig) {
    match API_CONFIG.write() {
        Ok(mut guard) => *guard = Some(config),
        Err(poisoned) => *poisoned.into_inner() = Some(config),
    }
}

/// Initialize the API configuration from the build-time `API_BASE_URL`.
pub fn init_api_config() -> Result<(), &'static str> {
    store_config(ApiConfig::new()?);
    Ok(())
}

/// Initialize the API configuration from a JS-provided URL.
/// This allows runtime configuration of the backend endpoints.
#[wasm_bindgen]
pub fn init_api_config_js(api_base_url: &str) -> Result<(), JsValue> {
    crate::debug_log!("Initializing API config from JS: {}", api_base_url);
    store_config(ApiConfig::from_url(api_base_url));
    Ok(())
}

fn with_config<T>(f: impl FnOnce(Option<&ApiConfig>) -> T) -> T {
    let guard = match API_CONFIG.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    f(guard.as_ref())
}

/// Get the base URL for backend calls. Empty means same origin.
pub(crate) fn get_api_base_url() -> String {
    with_config(|cfg| cfg.map(|c| c.base_url().to_string()).unwrap_or_default())
}

/// Full URL of a backend route. Missing config falls back to the relative
/// path (same origin).
pub(crate) fn endpoint_url(path: &str) -> String {
    with_config(|cfg| cfg.map_or_else(|| path.to_string(), |c| c.url(path)))
}

/// Every backend endpoint the widget core depends on.
///
/// Futures are `!Send`: the widget runs on the browser's single thread.
pub trait PromptBackend {
    fn translate(&self, req: TranslateRequest) -> LocalBoxFuture<'_, Result<TranslateResult, WidgetError>>;
    /// Returns the expanded text.
    fn expand(&self, req: ExpandRequest) -> LocalBoxFuture<'_, Result<String, WidgetError>>;
    fn load_presets(&self) -> LocalBoxFuture<'_, Result<Vec<Preset>, WidgetError>>;
    fn save_presets(&self, presets: Vec<Preset>) -> LocalBoxFuture<'_, Result<(), WidgetError>>;
    fn load_config(&self) -> LocalBoxFuture<'_, Result<WidgetConfig, WidgetError>>;
    fn save_config(&self, config: WidgetConfig) -> LocalBoxFuture<'_, Result<(), WidgetError>>;
    fn set_debug(&self, debug: bool) -> LocalBoxFuture<'_, Result<(), WidgetError>>;
}
