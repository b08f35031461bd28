// src/messages.rs
//
// Everything a widget's buttons can ask for, plus the status and outcome
// values the coordinator reports back to the presentation layer.
//
use std::fmt;
use std::str::FromStr;

use crate::models::WidgetKey;

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetAction {
    // Popups (rendered by the host; the core only answers with data)
    ShowHistory,
    ShowPresets,

    // History navigation
    Undo,
    Redo,
    ClearHistory,
    CommitText,                          // textarea blur
    ApplyHistoryItem {                   // pick a row from the merged history view
        source: WidgetKey,
        text: String,
    },

    // Backend operations
    Translate,
    Expand,

    // Preset splicing
    ApplyPreset(String),
    RemovePreset(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown widget action: {}", self.0)
    }
}

impl std::error::Error for UnknownAction {}

impl FromStr for WidgetAction {
    type Err = UnknownAction;

    /// Parses the host's button tags. Payload-carrying actions are built directly.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "history" => Ok(WidgetAction::ShowHistory),
            "undo" => Ok(WidgetAction::Undo),
            "redo" => Ok(WidgetAction::Redo),
            "translate" => Ok(WidgetAction::Translate),
            "expand" => Ok(WidgetAction::Expand),
            "preset" => Ok(WidgetAction::ShowPresets),
            "clear_history" => Ok(WidgetAction::ClearHistory),
            "commit" | "blur" => Ok(WidgetAction::CommitText),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

/// Flavour of a transient status tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Loading,
    Success,
    Error,
    Info,
    Restore,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Loading => "loading",
            StatusKind::Success => "success",
            StatusKind::Error => "error",
            StatusKind::Info => "info",
            StatusKind::Restore => "restore",
        }
    }
}

/// Undo/redo availability for one widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    pub has_past: bool,
    pub has_future: bool,
}

/// How a translate/expand attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    Translated { text: String, from_cache: bool },
    /// Served from the translation cache without a backend call.
    Restored { text: String, to_original: bool },
    Expanded { text: String },
    /// The widget went away before the response arrived.
    Discarded,
}

/// Result of dispatching one [`WidgetAction`].
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Operation(OperationOutcome),
    /// New buffer text after undo/redo/preset/history pick, `None` when nothing changed.
    Text(Option<String>),
    History(Vec<crate::history::HistoryRecord>),
    Presets(Vec<crate::models::Preset>),
    Done,
}
