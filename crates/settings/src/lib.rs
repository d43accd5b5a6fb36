//! Operator settings for the collection console.
//!
//! One JSON record on local disk, the console-side analog of the browser's
//! persistent key-value store. Loading never fails: a missing or corrupt file
//! falls back to defaults, and a partially valid record is filled field by
//! field. Every update is validated, persisted synchronously and published on
//! a watch channel so the API client can retarget itself.
//!
//! # Example
//!
//! ```no_run
//! use settings::{SettingsPatch, SettingsStore};
//!
//! # fn example() -> Result<(), settings::SettingsError> {
//! let store = SettingsStore::open("console_settings.json");
//!
//! let current = store.get();
//! println!("backend at {}", current.api_url);
//!
//! store.update(SettingsPatch {
//!     demo_mode: Some(false),
//!     ..SettingsPatch::default()
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod model;
pub mod store;

pub use error::SettingsError;
pub use model::{Language, Settings, SettingsPatch, Theme, DEFAULT_API_URL};
pub use store::SettingsStore;
