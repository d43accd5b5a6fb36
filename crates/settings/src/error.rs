//! Error types for the settings store.

use thiserror::Error;

/// Errors that can occur when updating settings.
///
/// Loading never fails (defaults are substituted), so the only failures are
/// validation rejections caught before anything is persisted.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The supplied API base address is not a valid absolute URL.
    #[error("invalid API URL: {0}")]
    InvalidApiUrl(String),
}
