use futures::future::LocalBoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::messages::{
    ExpandRequest, ExpandResponse, SavePresetsRequest, SetDebugRequest, StatusResponse,
    TranslateRequest, TranslateResponse, TranslateResult,
};
use super::PromptBackend;
use crate::constants::{
    PATH_EXPAND, PATH_LOAD_CONFIG, PATH_PRESETS, PATH_SAVE_CONFIG, PATH_SAVE_PRESETS,
    PATH_SET_DEBUG, PATH_TRANSLATE,
};
use crate::errors::WidgetError;
use crate::models::{Preset, PresetList, WidgetConfig};
use crate::utils::preview;

/// Raw reply of one `fetch` round trip.
pub struct FetchReply {
    pub status: u16,
    pub ok: bool,
    pub body: String,
}

// REST client for the prompt widget backend routes
#[derive(Debug, Default, Clone, Copy)]
pub struct ApiClient;

impl ApiClient {
    pub fn new() -> Self {
        Self
    }

    fn url(path: &str) -> String {
        super::endpoint_url(path)
    }

    /// Issue one request and hand back status plus body text. Only transport
    /// failures are errors here; callers decide what a non-2xx status means.
    pub async fn fetch_json(url: &str, method: &str, body: Option<&str>) -> Result<FetchReply, JsValue> {
        use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::SameOrigin);

        let headers = Headers::new()?;
        if let Some(data) = body {
            opts.set_body(&JsValue::from_str(data));
            headers.append("Content-Type", "application/json")?;
        }
        opts.set_headers(&headers);

        let request = Request::new_with_str_and_init(url, &opts)?;

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window exists"))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
        let resp: Response = resp_value.dyn_into()?;

        let text = JsFuture::from(resp.text()?).await?;
        Ok(FetchReply {
            status: resp.status(),
            ok: resp.ok(),
            body: text.as_string().unwrap_or_default(),
        })
    }

    /// `fetch_json` plus status check and JSON decoding, in `WidgetError` terms.
    async fn call<B, R>(method: &str, path: &str, body: Option<&B>) -> Result<R, WidgetError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let payload = body.map(serde_json::to_string).transpose()?;
        let url = Self::url(path);
        debug_log!("{} {}", method, url);

        let reply = Self::fetch_json(&url, method, payload.as_deref())
            .await
            .map_err(|e| WidgetError::Network(js_error_message(&e)))?;

        if !reply.ok {
            log::warn!("{} {} failed with status {}", method, path, reply.status);
            return Err(WidgetError::Http { status: reply.status });
        }
        debug_log!("{} response: {}", path, preview(&reply.body, 100));
        Ok(serde_json::from_str(&reply.body)?)
    }
}

fn js_error_message(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

impl PromptBackend for ApiClient {
    fn translate(&self, req: TranslateRequest) -> LocalBoxFuture<'_, Result<TranslateResult, WidgetError>> {
        async move {
            let resp: TranslateResponse = Self::call("POST", PATH_TRANSLATE, Some(&req)).await?;
            resp.into_result()
        }
        .boxed_local()
    }

    fn expand(&self, req: ExpandRequest) -> LocalBoxFuture<'_, Result<String, WidgetError>> {
        async move {
            let resp: ExpandResponse = Self::call("POST", PATH_EXPAND, Some(&req)).await?;
            resp.into_result()
        }
        .boxed_local()
    }

    fn load_presets(&self) -> LocalBoxFuture<'_, Result<Vec<Preset>, WidgetError>> {
        async move {
            let list: PresetList = Self::call::<(), _>("GET", PATH_PRESETS, None).await?;
            Ok(list.presets)
        }
        .boxed_local()
    }

    fn save_presets(&self, presets: Vec<Preset>) -> LocalBoxFuture<'_, Result<(), WidgetError>> {
        async move {
            let body = SavePresetsRequest { presets };
            let resp: StatusResponse = Self::call("POST", PATH_SAVE_PRESETS, Some(&body)).await?;
            resp.into_result()
        }
        .boxed_local()
    }

    fn load_config(&self) -> LocalBoxFuture<'_, Result<WidgetConfig, WidgetError>> {
        async move { Self::call::<(), _>("GET", PATH_LOAD_CONFIG, None).await }.boxed_local()
    }

    fn save_config(&self, config: WidgetConfig) -> LocalBoxFuture<'_, Result<(), WidgetError>> {
        async move {
            let resp: StatusResponse = Self::call("POST", PATH_SAVE_CONFIG, Some(&config)).await?;
            resp.into_result()
        }
        .boxed_local()
    }

    fn set_debug(&self, debug: bool) -> LocalBoxFuture<'_, Result<(), WidgetError>> {
        async move {
            let body = SetDebugRequest { debug };
            let resp: StatusResponse = Self::call("POST", PATH_SET_DEBUG, Some(&body)).await?;
            resp.into_result()
        }
        .boxed_local()
    }
}
