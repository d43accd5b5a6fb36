//! Configuration for the backend API client.

/// Configuration for connecting to the collection backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the backend HTTP server (e.g., "http://localhost:8000").
    pub base_url: String,
}

impl ApiConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Get the clients listing endpoint URL.
    pub fn clients_url(&self) -> String {
        format!("{}/api/v1/clients", self.base_url)
    }

    /// Get the single-client endpoint URL.
    pub fn client_url(&self, id: i64) -> String {
        format!("{}/api/v1/clients/{}", self.base_url, id)
    }

    /// Get the spreadsheet upload endpoint URL.
    pub fn upload_url(&self) -> String {
        format!("{}/api/v1/upload", self.base_url)
    }

    /// Get the call processing endpoint URL for a client.
    pub fn process_url(&self, id: i64) -> String {
        format!("{}/api/v1/process/{}", self.base_url, id)
    }

    /// Get the recorded-response upload endpoint URL for a client.
    pub fn response_url(&self, id: i64) -> String {
        format!("{}/api/v1/process/{}/response", self.base_url, id)
    }

    /// Get the spreadsheet export endpoint URL.
    pub fn export_url(&self) -> String {
        format!("{}/api/v1/export", self.base_url)
    }

    /// Get the call history endpoint URL.
    pub fn history_url(&self) -> String {
        format!("{}/api/v1/history", self.base_url)
    }

    /// Get the statistics endpoint URL.
    pub fn statistics_url(&self) -> String {
        format!("{}/api/v1/statistics", self.base_url)
    }

    /// Get the health check endpoint URL.
    pub fn health_url(&self) -> String {
        format!("{}/api/v1/health", self.base_url)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000")
    }
}
