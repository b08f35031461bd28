//! Wire shapes for the backend endpoints and the push-event channel.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::{
    EVENT_CONFIG_UPDATE, EVENT_TRANSLATE_UPDATE, MSG_EXPAND_FAILED, MSG_TRANSLATE_FAILED,
};
use crate::errors::WidgetError;
use crate::models::{Preset, WidgetConfig};

// ---------------------------------------------------------------------------
// HTTP request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslateRequest {
    pub text: String,
    pub node_id: String,
    pub from_lang: String,
    pub to_lang: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TranslateResponse {
    pub status: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub from_cache: Option<bool>,
}

/// A successful translation.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateResult {
    pub text: String,
    pub from_cache: bool,
}

impl TranslateResponse {
    pub fn into_result(self) -> Result<TranslateResult, WidgetError> {
        match (self.status.as_str(), self.text) {
            ("success", Some(text)) if !text.is_empty() => Ok(TranslateResult {
                text,
                from_cache: self.from_cache.unwrap_or(false),
            }),
            _ => Err(WidgetError::Backend(
                self.message
                    .unwrap_or_else(|| MSG_TRANSLATE_FAILED.to_string()),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpandRequest {
    pub text: String,
    pub node_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExpandResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub expanded_text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExpandResponse {
    pub fn into_result(self) -> Result<String, WidgetError> {
        match self.expanded_text {
            Some(text) if self.success && !text.is_empty() => Ok(text),
            _ => Err(WidgetError::Backend(
                self.error.unwrap_or_else(|| MSG_EXPAND_FAILED.to_string()),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavePresetsRequest {
    pub presets: Vec<Preset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetDebugRequest {
    pub debug: bool,
}

/// `{status, message?}` acknowledgement used by the save/debug endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusResponse {
    pub fn into_result(self) -> Result<(), WidgetError> {
        if self.status == "success" {
            Ok(())
        } else {
            Err(WidgetError::Backend(
                self.message.unwrap_or_else(|| "update failed".to_string()),
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Push events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStatus {
    Translating,
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Progress {
    pub current: u32,
    pub total: u32,
}

/// Payload of `prompt_translate_update`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TranslateUpdate {
    #[serde(deserialize_with = "id_string")]
    pub node_id: String,
    pub status: UpdateStatus,
    #[serde(default)]
    pub translated_text: Option<String>,
    #[serde(default)]
    pub original_text: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub progress: Option<Progress>,
    #[serde(default)]
    pub operation_type: Option<String>,
    #[serde(default)]
    pub operation_desc: Option<String>,
    #[serde(default)]
    pub translate_direction: Option<String>,
    #[serde(default)]
    pub from_cache: Option<bool>,
}

impl TranslateUpdate {
    pub fn is_restore(&self) -> bool {
        self.operation_type.as_deref() == Some("restore")
    }
}

/// Payload of `prompt_widget_config_update`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfigUpdate {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub config: Option<WidgetConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    TranslateUpdate(TranslateUpdate),
    ConfigUpdate(ConfigUpdate),
}

impl PushEvent {
    /// Decode a push event. Unknown event names yield `Ok(None)`.
    pub fn parse(name: &str, payload: Value) -> Result<Option<Self>, WidgetError> {
        match name {
            EVENT_TRANSLATE_UPDATE => Ok(Some(PushEvent::TranslateUpdate(
                serde_json::from_value(payload)?,
            ))),
            EVENT_CONFIG_UPDATE => Ok(Some(PushEvent::ConfigUpdate(serde_json::from_value(
                payload,
            )?))),
            _ => Ok(None),
        }
    }
}

/// Node ids arrive as numbers from the graph and as strings from the widget.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("invalid node_id: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn translate_response_maps_to_result() {
        let ok: TranslateResponse =
            serde_json::from_value(json!({"status": "success", "text": "你好世界"})).unwrap();
        assert_eq!(
            ok.into_result(),
            Ok(TranslateResult {
                text: "你好世界".into(),
                from_cache: false
            })
        );

        let err: TranslateResponse =
            serde_json::from_value(json!({"status": "error", "message": "bad key"})).unwrap();
        assert_eq!(err.into_result(), Err(WidgetError::Backend("bad key".into())));

        let empty: TranslateResponse =
            serde_json::from_value(json!({"status": "success"})).unwrap();
        assert_eq!(
            empty.into_result(),
            Err(WidgetError::Backend(MSG_TRANSLATE_FAILED.into()))
        );
    }

    #[test]
    fn expand_response_requires_success_flag() {
        let r: ExpandResponse =
            serde_json::from_value(json!({"success": false, "expanded_text": "x", "error": "quota"}))
                .unwrap();
        assert_eq!(r.into_result(), Err(WidgetError::Backend("quota".into())));
    }

    #[test]
    fn push_update_accepts_numeric_node_id() {
        let event = PushEvent::parse(
            EVENT_TRANSLATE_UPDATE,
            json!({
                "node_id": 17,
                "status": "translating",
                "progress": {"current": 2, "total": 5}
            }),
        )
        .unwrap();
        match event {
            Some(PushEvent::TranslateUpdate(update)) => {
                assert_eq!(update.node_id, "17");
                assert_eq!(update.status, UpdateStatus::Translating);
                assert_eq!(update.progress, Some(Progress { current: 2, total: 5 }));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn push_update_without_node_is_rejected() {
        let err = PushEvent::parse(EVENT_TRANSLATE_UPDATE, json!({"status": "success"}));
        assert!(matches!(err, Err(WidgetError::Malformed(_))));
        assert_eq!(PushEvent::parse("status", json!({})), Ok(None));
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let update: TranslateUpdate =
            serde_json::from_value(json!({"node_id": "3", "status": "queued"})).unwrap();
        assert_eq!(update.status, UpdateStatus::Unknown);
    }
}
