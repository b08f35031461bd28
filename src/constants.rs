// Limits and defaults for the widget core - single source of truth.

/// Maximum number of prior states kept in a widget's undo log.
pub const HISTORY_LIMIT: usize = 20;

/// Minimum spacing between two identical translate requests for one node.
pub const THROTTLE_INTERVAL_MS: i64 = 1000;

/// Share of CJK characters above which a text is treated as CJK source.
pub const CJK_RATIO_THRESHOLD: f64 = 0.2;

/// Translation memo table capacity, counted in directed entries (two per pair).
pub const TRANSLATION_CACHE_CAPACITY: usize = 4096;

// Reclamation sweep timing
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u32 = 60;
pub const MIN_CLEANUP_INTERVAL_SECS: u32 = 10;
pub const MAX_CLEANUP_INTERVAL_SECS: u32 = 120;
/// A user counts as active for this long after the last pointer/key/click event.
pub const USER_IDLE_AFTER_MS: i64 = 5000;

// Language codes understood by the translate endpoint
pub const LANG_AUTO: &str = "auto";
pub const LANG_CJK: &str = "zh";
pub const LANG_LATIN: &str = "en";

// Backend endpoints
pub const PATH_TRANSLATE: &str = "/prompt_translate";
pub const PATH_EXPAND: &str = "/expand_text";
pub const PATH_PRESETS: &str = "/prompt_widget/presets";
pub const PATH_SAVE_PRESETS: &str = "/prompt_widget/save_presets";
pub const PATH_LOAD_CONFIG: &str = "/prompt_widget/load_config";
pub const PATH_SAVE_CONFIG: &str = "/prompt_widget/save_config";
pub const PATH_SET_DEBUG: &str = "/prompt_widget/set_debug";

// Push events
pub const EVENT_TRANSLATE_UPDATE: &str = "prompt_translate_update";
pub const EVENT_CONFIG_UPDATE: &str = "prompt_widget_config_update";

// Host settings panel ids
pub const SETTING_ENABLED: &str = "PromptWidget.Features.Enabled";
pub const SETTING_HISTORY: &str = "PromptWidget.Features.History";
pub const SETTING_PRESET: &str = "PromptWidget.Features.Preset";
pub const SETTING_EXPAND: &str = "PromptWidget.Features.Expand";
pub const SETTING_TRANSLATE: &str = "PromptWidget.Features.Translate";
pub const SETTING_DEBUG_FRONTEND: &str = "PromptWidget.Debug.Frontend";
pub const SETTING_DEBUG_BACKEND: &str = "PromptWidget.Debug.Backend";
pub const SETTING_CLEANUP_INTERVAL: &str = "PromptWidget.Cleanup.Interval";

/// `operation_desc` value the backend sends when a restore brought back the source text.
pub const RESTORE_ORIGINAL_DESC: &str = "恢复原文";

// Status messages
pub const MSG_TRANSLATING: &str = "Translating...";
pub const MSG_EXPANDING: &str = "Expanding...";
pub const MSG_TRANSLATE_BUSY: &str = "Translation in progress, please wait...";
pub const MSG_EXPAND_BUSY: &str = "Expansion in progress, please wait...";
pub const MSG_NOTHING_TO_TRANSLATE: &str = "No text to translate";
pub const MSG_NOTHING_TO_EXPAND: &str = "No text to expand";
pub const MSG_THROTTLED: &str = "Too many requests, please try again shortly";
pub const MSG_TRANSLATE_FAILED: &str = "Translation failed";
pub const MSG_EXPAND_FAILED: &str = "Expansion failed";
pub const MSG_TRANSLATE_DONE: &str = "Translation complete";
pub const MSG_EXPAND_DONE: &str = "Expansion complete";
pub const MSG_RESTORED_TRANSLATION: &str = "Translation";
pub const MSG_RESTORED_ORIGINAL: &str = "Original";
pub const MSG_RESTORED: &str = "Restored";
pub const MSG_PRESET_EXISTS: &str = "Preset already exists";
pub const MSG_PRESET_APPLIED: &str = "Preset applied";
pub const MSG_PRESET_NOT_FOUND: &str = "Preset content not found";
pub const MSG_PRESET_REMOVED: &str = "Preset removed";
pub const MSG_NO_PRESETS: &str = "No presets available";
pub const MSG_NO_HISTORY: &str = "No history yet";
pub const MSG_HISTORY_CLEARED: &str = "History cleared";
pub const MSG_CONFIG_UPDATED: &str = "Configuration updated";
