//! File-backed settings store.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tokio::sync::watch;
use tracing::warn;
use url::Url;

use crate::error::SettingsError;
use crate::model::{Settings, SettingsPatch};

/// Store for the single operator settings record.
///
/// The record lives in memory behind a lock and is mirrored to one JSON file.
/// Reads are cheap clones; updates persist synchronously and publish the new
/// record to subscribers. There is no cross-process synchronization: two
/// consoles pointed at the same file will overwrite each other.
#[derive(Clone)]
pub struct SettingsStore {
    path: PathBuf,
    current: Arc<RwLock<Settings>>,
    updates: Arc<watch::Sender<Settings>>,
}

impl SettingsStore {
    /// Open the store at the given path.
    ///
    /// Never fails: a missing file yields defaults, a corrupt file is logged
    /// and yields defaults, and a partially valid record is filled field by
    /// field over defaults.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = Self::load_from(&path);
        let (updates, _) = watch::channel(settings.clone());
        Self {
            path,
            current: Arc::new(RwLock::new(settings)),
            updates: Arc::new(updates),
        }
    }

    /// The current settings record.
    pub fn get(&self) -> Settings {
        self.current
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Validate a patch, merge it over the current record, persist and
    /// publish the result.
    ///
    /// Validation failures reject the whole patch before anything changes.
    /// A persistence failure is logged and does not roll the update back:
    /// the in-memory record is the one callers observe either way.
    pub fn update(&self, patch: SettingsPatch) -> Result<Settings, SettingsError> {
        if let Some(api_url) = &patch.api_url {
            Url::parse(api_url).map_err(|_| SettingsError::InvalidApiUrl(api_url.clone()))?;
        }

        let merged = {
            let mut current = self
                .current
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let merged = patch.apply(current.clone());
            *current = merged.clone();
            merged
        };

        self.persist(&merged);
        let _ = self.updates.send(merged.clone());
        Ok(merged)
    }

    /// Restore defaults and erase the stored record. Idempotent.
    pub fn reset(&self) -> Settings {
        let defaults = Settings::default();
        {
            let mut current = self
                .current
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            *current = defaults.clone();
        }

        if let Err(err) = std::fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), "Failed to remove settings file: {}", err);
            }
        }

        let _ = self.updates.send(defaults.clone());
        defaults
    }

    /// Subscribe to settings changes.
    ///
    /// The receiver observes every `update` and `reset`; the console uses
    /// this to retarget the API client when the base address changes.
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.updates.subscribe()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from(path: &Path) -> Settings {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Settings::default();
            }
            Err(err) => {
                warn!(path = %path.display(), "Failed to read settings file: {}", err);
                return Settings::default();
            }
        };

        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => Settings::from_stored(&value),
            Err(err) => {
                warn!(path = %path.display(), "Stored settings are corrupt, using defaults: {}", err);
                Settings::default()
            }
        }
    }

    fn persist(&self, settings: &Settings) {
        let encoded = match serde_json::to_string_pretty(settings) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!("Failed to encode settings: {}", err);
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, encoded) {
            warn!(path = %self.path.display(), "Failed to persist settings: {}", err);
        }
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Language, DEFAULT_API_URL};

    fn store_in(dir: &tempfile::TempDir) -> SettingsStore {
        SettingsStore::open(dir.path().join("settings.json"))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.get(), Settings::default());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = SettingsStore::open(&path);
        assert_eq!(store.get(), Settings::default());
    }

    #[test]
    fn update_persists_and_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::open(&path);
        store
            .update(SettingsPatch {
                api_url: Some("http://10.0.0.5:9000".to_string()),
                ..SettingsPatch::default()
            })
            .unwrap();

        let reopened = SettingsStore::open(&path);
        let settings = reopened.get();
        assert_eq!(settings.api_url, "http://10.0.0.5:9000");
        assert_eq!(settings.language, Language::Ru);
        assert!(settings.demo_mode);
    }

    #[test]
    fn partial_stored_record_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"demo_mode": false, "language": "kk"}"#).unwrap();

        let store = SettingsStore::open(&path);
        let settings = store.get();
        assert!(!settings.demo_mode);
        assert_eq!(settings.language, Language::Kk);
        assert_eq!(settings.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn invalid_url_is_rejected_before_merge() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let err = store
            .update(SettingsPatch {
                api_url: Some("nonsense".to_string()),
                demo_mode: Some(false),
                ..SettingsPatch::default()
            })
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidApiUrl(_)));
        // Nothing from the rejected patch was applied.
        assert!(store.get().demo_mode);
    }

    #[test]
    fn reset_twice_is_idempotent_and_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::open(&path);
        store
            .update(SettingsPatch {
                auto_refresh_interval: Some(60),
                ..SettingsPatch::default()
            })
            .unwrap();
        assert!(path.exists());

        let first = store.reset();
        let second = store.reset();
        assert_eq!(first, Settings::default());
        assert_eq!(second, Settings::default());
        assert!(!path.exists());
    }

    #[test]
    fn updates_are_published_to_subscribers() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut rx = store.subscribe();

        store
            .update(SettingsPatch {
                api_url: Some("http://backend:8000".to_string()),
                ..SettingsPatch::default()
            })
            .unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().api_url, "http://backend:8000");
    }
}
