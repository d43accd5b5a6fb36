//! Collection backend HTTP client.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::multipart;
use serde::Deserialize;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::types::{
    AnalyticsData, CallRecordWithClient, Client, ClientQuery, HistoryQuery, Page, ProcessResponse,
    UploadResponse,
};

/// Error body shape used by the backend (`{"detail": "..."}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// JSON body for the process endpoint.
#[derive(Debug, serde::Serialize)]
struct ProcessRequest {
    use_demo: bool,
}

/// Client for the collection dialer backend.
///
/// Holds one configured `reqwest` client with a fixed 30-second timeout. The
/// base address can be retargeted at runtime via [`CollectClient::set_base_url`]
/// so existing callers pick up a settings change without being recreated.
#[derive(Clone)]
pub struct CollectClient {
    http: reqwest::Client,
    config: Arc<RwLock<ApiConfig>>,
}

impl CollectClient {
    /// Create a client for the given backend.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        Url::parse(&config.base_url)
            .map_err(|_| ApiError::InvalidBaseUrl(config.base_url.clone()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(ApiError::Http)?;

        Ok(Self {
            http,
            config: Arc::new(RwLock::new(config)),
        })
    }

    /// The base URL all requests are currently sent to.
    pub fn base_url(&self) -> String {
        self.config().base_url
    }

    /// Retarget all future requests to a new base URL.
    pub fn set_base_url(&self, base_url: &str) -> Result<(), ApiError> {
        Url::parse(base_url).map_err(|_| ApiError::InvalidBaseUrl(base_url.to_string()))?;

        let mut config = self
            .config
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if config.base_url != base_url {
            debug!(from = %config.base_url, to = %base_url, "Retargeting API client");
            config.base_url = base_url.to_string();
        }
        Ok(())
    }

    /// List debtor records, paginated and optionally filtered.
    pub async fn list_clients(&self, query: &ClientQuery) -> Result<Page<Client>, ApiError> {
        let url = self.config().clients_url();
        debug!(page = query.page, limit = query.limit, "Listing clients");

        let response = self
            .execute(self.http.get(&url).query(&query.to_params()))
            .await?;
        Ok(response.json().await?)
    }

    /// Fetch a single debtor record by id.
    pub async fn get_client(&self, id: i64) -> Result<Client, ApiError> {
        let url = self.config().client_url(id);
        let response = self.execute(self.http.get(&url)).await?;
        Ok(response.json().await?)
    }

    /// Upload a debtor spreadsheet. The backend parses the file and creates
    /// pending records; rows it cannot use are counted, not fatal.
    pub async fn upload_spreadsheet(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ApiError> {
        let url = self.config().upload_url();
        debug!(filename, size = bytes.len(), "Uploading spreadsheet");

        let part = multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self.execute(self.http.post(&url).multipart(form)).await?;
        Ok(response.json().await?)
    }

    /// Trigger an outbound call for a client. `use_demo` routes the backend
    /// to synthetic responses instead of a real call.
    pub async fn process_client(
        &self,
        id: i64,
        use_demo: bool,
    ) -> Result<ProcessResponse, ApiError> {
        let url = self.config().process_url(id);
        debug!(id, use_demo, "Processing client");

        let response = self
            .execute(self.http.post(&url).json(&ProcessRequest { use_demo }))
            .await?;
        Ok(response.json().await?)
    }

    /// Submit a recorded debtor reply for recognition and classification.
    pub async fn submit_response_audio(
        &self,
        id: i64,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<ProcessResponse, ApiError> {
        let url = self.config().response_url(id);
        debug!(id, filename, size = bytes.len(), "Submitting response audio");

        let part = multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = multipart::Form::new().part("audio", part);

        let response = self.execute(self.http.post(&url).multipart(form)).await?;
        Ok(response.json().await?)
    }

    /// Export debtor records as a binary spreadsheet, optionally filtered.
    pub async fn export_results(
        &self,
        status: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.config().export_url();

        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(status) = status {
            params.push(("status", status));
        }
        if let Some(category) = category {
            params.push(("category", category));
        }
        debug!(?status, ?category, "Exporting results");

        let response = self.execute(self.http.get(&url).query(&params)).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// List call records joined with their client snapshots.
    pub async fn call_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<Page<CallRecordWithClient>, ApiError> {
        let url = self.config().history_url();
        debug!(page = query.page, limit = query.limit, "Listing call history");

        let response = self
            .execute(self.http.get(&url).query(&query.to_params()))
            .await?;
        Ok(response.json().await?)
    }

    /// Fetch aggregate statistics.
    pub async fn statistics(&self) -> Result<AnalyticsData, ApiError> {
        let url = self.config().statistics_url();
        let response = self.execute(self.http.get(&url)).await?;
        Ok(response.json().await?)
    }

    /// Check whether the backend is reachable and healthy.
    pub async fn health_check(&self) -> Result<bool, ApiError> {
        let url = self.config().health_url();
        match self.http.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(err) => Err(ApiError::Http(err)),
        }
    }

    /// Snapshot of the current configuration.
    fn config(&self) -> ApiConfig {
        self.config
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Send a request and classify failures.
    ///
    /// Failure classification is a logging seam only: errors are logged by
    /// bucket (server error body, transport failure) and then returned
    /// unchanged for the caller to handle.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                if err.is_timeout() {
                    error!("Request timed out: {}", err);
                } else {
                    error!("Network error: {}", err);
                }
                return Err(ApiError::Http(err));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|parsed| parsed.detail)
                .unwrap_or_else(|| {
                    if body.is_empty() {
                        status
                            .canonical_reason()
                            .unwrap_or("request failed")
                            .to_string()
                    } else {
                        body
                    }
                });
            warn!(status = status.as_u16(), %detail, "Backend returned error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response)
    }
}

impl std::fmt::Debug for CollectClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectClient")
            .field("base_url", &self.base_url())
            .finish()
    }
}
