//! Application state shared across handlers.

use collect_api::CollectClient;
use settings::SettingsStore;

use crate::queries::Queries;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Backend API client.
    pub api: CollectClient,
    /// Operator settings store.
    pub settings: SettingsStore,
    /// Cached backend reads.
    pub queries: Queries,
}

impl AppState {
    /// Create new application state.
    pub fn new(api: CollectClient, settings: SettingsStore) -> Self {
        Self {
            api,
            settings,
            queries: Queries::new(),
        }
    }
}
