use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::models::{OperationKind, WidgetKey};

/// Every failure is local to one attempt; nothing here is fatal to the extension.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WidgetError {
    #[error("{0} is disabled")]
    FeatureDisabled(&'static str),
    #[error("no widget instance for {0}")]
    MissingInstance(WidgetKey),
    #[error("widget {0} has no text input")]
    MissingTextBuffer(WidgetKey),
    #[error("nothing to {0}")]
    EmptyText(OperationKind),
    #[error("request throttled")]
    Throttled,
    #[error("{0} already in progress")]
    Busy(OperationKind),
    #[error("{0}")]
    Backend(String),
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },
    #[error("request failed: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Throttled,
    Backend,
    Concurrency,
}

impl WidgetError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WidgetError::FeatureDisabled(_)
            | WidgetError::MissingInstance(_)
            | WidgetError::MissingTextBuffer(_)
            | WidgetError::EmptyText(_) => ErrorCategory::Validation,
            WidgetError::Throttled => ErrorCategory::Throttled,
            WidgetError::Busy(_) => ErrorCategory::Concurrency,
            WidgetError::Backend(_)
            | WidgetError::Http { .. }
            | WidgetError::Network(_)
            | WidgetError::Malformed(_) => ErrorCategory::Backend,
        }
    }
}

impl From<serde_json::Error> for WidgetError {
    fn from(e: serde_json::Error) -> Self {
        WidgetError::Malformed(e.to_string())
    }
}

impl From<WidgetError> for JsValue {
    fn from(e: WidgetError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_taxonomy() {
        let key = WidgetKey::new("1", "text");
        assert_eq!(
            WidgetError::MissingInstance(key).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            WidgetError::EmptyText(OperationKind::Expand).category(),
            ErrorCategory::Validation
        );
        assert_eq!(WidgetError::Throttled.category(), ErrorCategory::Throttled);
        assert_eq!(
            WidgetError::Busy(OperationKind::Translate).category(),
            ErrorCategory::Concurrency
        );
        assert_eq!(
            WidgetError::Http { status: 502 }.category(),
            ErrorCategory::Backend
        );
    }

    #[test]
    fn backend_message_is_shown_verbatim() {
        assert_eq!(WidgetError::Backend("quota exceeded".into()).to_string(), "quota exceeded");
    }
}
