use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one (node, input) pair. Used as the join key by every store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetKey(String);

impl WidgetKey {
    /// Compose the key the way the host integration does: `"{node}_{input}"`.
    pub fn new(node_id: &str, input_id: &str) -> Self {
        Self(format!("{}_{}", node_id, input_id))
    }

    /// Wrap an already composed key (e.g. one round-tripped through the DOM).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Node id part of the key (everything before the first `_`).
    pub fn node_id(&self) -> &str {
        self.0.split('_').next().unwrap_or(&self.0)
    }

    /// Input id part of the key (everything after the first `_`), empty if absent.
    pub fn input_id(&self) -> &str {
        self.0.split_once('_').map(|(_, input)| input).unwrap_or("")
    }
}

impl fmt::Display for WidgetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Long-running operations a widget can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Translate,
    Expand,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Translate => write!(f, "translate"),
            OperationKind::Expand => write!(f, "expand"),
        }
    }
}

/// Direction picked by the CJK heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslateDirection {
    CjkToLatin,
    LatinToCjk,
}

impl TranslateDirection {
    pub fn from_lang(&self) -> &'static str {
        crate::constants::LANG_AUTO
    }

    pub fn to_lang(&self) -> &'static str {
        match self {
            TranslateDirection::CjkToLatin => crate::constants::LANG_LATIN,
            TranslateDirection::LatinToCjk => crate::constants::LANG_CJK,
        }
    }

    /// Detected source and target, as shown in status tips (`zh->en`).
    pub fn label(&self) -> &'static str {
        match self {
            TranslateDirection::CjkToLatin => "zh->en",
            TranslateDirection::LatinToCjk => "en->zh",
        }
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Preset {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub content: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub color_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PresetList {
    #[serde(default)]
    pub presets: Vec<Preset>,
}

// ---------------------------------------------------------------------------
// Backend configuration document (`/prompt_widget/load_config`)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WidgetConfig {
    #[serde(default)]
    pub prompt_translate: TranslateCredentials,
    #[serde(default)]
    pub llm_expand: LlmExpandConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TranslateCredentials {
    #[serde(default)]
    pub appid: String,
    #[serde(default)]
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmExpandConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_base: String,
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub system_prompt: String,
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

impl Default for LlmExpandConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: String::new(),
            model: String::new(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            system_prompt: String::new(),
        }
    }
}
