//! Feature toggles mirrored from the host settings panel.

use serde_json::Value;

use crate::constants::{
    DEFAULT_CLEANUP_INTERVAL_SECS, MAX_CLEANUP_INTERVAL_SECS, MIN_CLEANUP_INTERVAL_SECS,
    SETTING_CLEANUP_INTERVAL, SETTING_DEBUG_BACKEND, SETTING_DEBUG_FRONTEND, SETTING_ENABLED,
    SETTING_EXPAND, SETTING_HISTORY, SETTING_PRESET, SETTING_TRANSLATE,
};
use crate::errors::WidgetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    History,
    Preset,
    Expand,
    Translate,
}

impl Feature {
    pub fn name(&self) -> &'static str {
        match self {
            Feature::History => "history",
            Feature::Preset => "preset",
            Feature::Expand => "expand",
            Feature::Translate => "translate",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFlags {
    /// Master switch.
    pub enabled: bool,
    pub history: bool,
    pub preset: bool,
    pub expand: bool,
    pub translate: bool,
    pub debug_frontend: bool,
    pub cleanup_interval_secs: u32,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enabled: true,
            history: true,
            preset: true,
            expand: true,
            translate: true,
            debug_frontend: false,
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
        }
    }
}

/// A parsed settings-panel change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingChange {
    Enabled(bool),
    Feature(Feature, bool),
    DebugFrontend(bool),
    DebugBackend(bool),
    CleanupInterval(u32),
}

impl SettingChange {
    /// Parse a `(setting id, value)` pair. Unknown ids and mistyped values yield `None`.
    pub fn parse(id: &str, value: &Value) -> Option<Self> {
        let flag = || value.as_bool();
        match id {
            SETTING_ENABLED => flag().map(SettingChange::Enabled),
            SETTING_HISTORY => flag().map(|v| SettingChange::Feature(Feature::History, v)),
            SETTING_PRESET => flag().map(|v| SettingChange::Feature(Feature::Preset, v)),
            SETTING_EXPAND => flag().map(|v| SettingChange::Feature(Feature::Expand, v)),
            SETTING_TRANSLATE => flag().map(|v| SettingChange::Feature(Feature::Translate, v)),
            SETTING_DEBUG_FRONTEND => flag().map(SettingChange::DebugFrontend),
            SETTING_DEBUG_BACKEND => flag().map(SettingChange::DebugBackend),
            SETTING_CLEANUP_INTERVAL => value
                .as_f64()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| SettingChange::CleanupInterval(v.round() as u32)),
            _ => None,
        }
    }
}

/// What the services must do after a settings change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingEffect {
    Nothing,
    /// Master switch went off (explicitly or because every feature is off).
    Shutdown { auto: bool },
    Startup,
    /// Master switch requested on while every feature is off; it stays off.
    Refused,
    FrontendDebug(bool),
    BackendDebug(bool),
    IntervalChanged(u32),
}

pub fn clamp_interval(secs: u32) -> u32 {
    secs.clamp(MIN_CLEANUP_INTERVAL_SECS, MAX_CLEANUP_INTERVAL_SECS)
}

impl FeatureFlags {
    pub fn all_disabled(&self) -> bool {
        !self.history && !self.preset && !self.expand && !self.translate
    }

    pub fn is_on(&self, feature: Feature) -> bool {
        self.enabled
            && match feature {
                Feature::History => self.history,
                Feature::Preset => self.preset,
                Feature::Expand => self.expand,
                Feature::Translate => self.translate,
            }
    }

    pub fn require(&self, feature: Feature) -> Result<(), WidgetError> {
        if self.is_on(feature) {
            Ok(())
        } else {
            Err(WidgetError::FeatureDisabled(feature.name()))
        }
    }

    /// Turn the master switch off once no feature is left on.
    pub fn update_enabled_state(&mut self) -> bool {
        if self.all_disabled() && self.enabled {
            self.enabled = false;
            log::info!("all features disabled, prompt widget switched off");
            return true;
        }
        false
    }

    pub fn apply(&mut self, change: SettingChange) -> SettingEffect {
        match change {
            SettingChange::Enabled(false) => {
                self.enabled = false;
                SettingEffect::Shutdown { auto: false }
            }
            SettingChange::Enabled(true) => {
                if self.all_disabled() {
                    self.enabled = false;
                    SettingEffect::Refused
                } else {
                    self.enabled = true;
                    SettingEffect::Startup
                }
            }
            SettingChange::Feature(feature, on) => {
                match feature {
                    Feature::History => self.history = on,
                    Feature::Preset => self.preset = on,
                    Feature::Expand => self.expand = on,
                    Feature::Translate => self.translate = on,
                }
                if self.update_enabled_state() {
                    SettingEffect::Shutdown { auto: true }
                } else {
                    SettingEffect::Nothing
                }
            }
            SettingChange::DebugFrontend(on) => {
                self.debug_frontend = on;
                SettingEffect::FrontendDebug(on)
            }
            SettingChange::DebugBackend(on) => SettingEffect::BackendDebug(on),
            SettingChange::CleanupInterval(secs) => {
                let secs = clamp_interval(secs);
                self.cleanup_interval_secs = secs;
                SettingEffect::IntervalChanged(secs)
            }
        }
    }
}
