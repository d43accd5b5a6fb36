//! The settings record and its defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Default backend base address.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Interface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ru,
    En,
    Kk,
}

impl Language {
    /// Wire representation of the language.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Ru => "ru",
            Language::En => "en",
            Language::Kk => "kk",
        }
    }
}

/// Interface theme. Current console chrome always renders light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

/// The single operator settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Base address of the collection backend.
    pub api_url: String,
    pub language: Language,
    pub theme: Theme,
    /// When set, processing uses synthetic call responses instead of placing
    /// real calls.
    pub demo_mode: bool,
    /// Page auto-refresh interval in seconds; 0 disables auto-refresh.
    pub auto_refresh_interval: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            language: Language::Ru,
            theme: Theme::Light,
            demo_mode: true,
            auto_refresh_interval: 0,
        }
    }
}

impl Settings {
    /// Rebuild a record from stored JSON, field by field.
    ///
    /// Each field is taken from the stored value only when it is present and
    /// valid; anything else falls back to the default for that field. The
    /// validation rules (URL well-formedness, non-negative interval) live
    /// here so stored and freshly submitted values pass the same checks.
    pub fn from_stored(value: &Value) -> Self {
        let defaults = Settings::default();
        Self {
            api_url: value
                .get("api_url")
                .and_then(Value::as_str)
                .filter(|raw| Url::parse(raw).is_ok())
                .map(str::to_string)
                .unwrap_or(defaults.api_url),
            language: value
                .get("language")
                .and_then(|raw| serde_json::from_value(raw.clone()).ok())
                .unwrap_or(defaults.language),
            theme: value
                .get("theme")
                .and_then(|raw| serde_json::from_value(raw.clone()).ok())
                .unwrap_or(defaults.theme),
            demo_mode: value
                .get("demo_mode")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.demo_mode),
            // A negative stored interval has no u64 representation and falls
            // through to the default.
            auto_refresh_interval: value
                .get("auto_refresh_interval")
                .and_then(Value::as_u64)
                .and_then(|raw| u32::try_from(raw).ok())
                .unwrap_or(defaults.auto_refresh_interval),
        }
    }
}

/// A partial settings update. Unset fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    pub api_url: Option<String>,
    pub language: Option<Language>,
    pub theme: Option<Theme>,
    pub demo_mode: Option<bool>,
    pub auto_refresh_interval: Option<u32>,
}

impl SettingsPatch {
    /// Merge this patch over an existing record.
    pub fn apply(self, current: Settings) -> Settings {
        Settings {
            api_url: self.api_url.unwrap_or(current.api_url),
            language: self.language.unwrap_or(current.language),
            theme: self.theme.unwrap_or(current.theme),
            demo_mode: self.demo_mode.unwrap_or(current.demo_mode),
            auto_refresh_interval: self
                .auto_refresh_interval
                .unwrap_or(current.auto_refresh_interval),
        }
    }
}
