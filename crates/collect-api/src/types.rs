//! Wire-level DTOs for the backend REST contract.
//!
//! The backend is the system of record; nothing here is derived client-side.
//! Timestamps are kept as strings in the backend's format and only parsed
//! for display.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Processing lifecycle stage of a debtor record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    /// Waiting in the call queue.
    Pending,
    /// A call is currently in progress.
    Processing,
    /// The call completed and was classified.
    Completed,
    /// The call could not be completed.
    Failed,
}

impl ClientStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [ClientStatus; 4] = [
        ClientStatus::Pending,
        ClientStatus::Processing,
        ClientStatus::Completed,
        ClientStatus::Failed,
    ];

    /// Wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Pending => "pending",
            ClientStatus::Processing => "processing",
            ClientStatus::Completed => "completed",
            ClientStatus::Failed => "failed",
        }
    }
}

/// Classified outcome of a call.
///
/// Values the classifier may add in the future decode as [`Category::Unknown`]
/// rather than failing the whole response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Debtor listened but would not engage.
    Ignore,
    /// Debtor promised to pay.
    Promise,
    /// Debtor asked for assistance or restructuring.
    Help,
    /// The number does not belong to the debtor.
    WrongNumber,
    /// A third party answered.
    ThirdParty,
    /// Debtor hung up.
    Hangup,
    /// Could not be classified.
    #[serde(other)]
    Unknown,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 7] = [
        Category::Ignore,
        Category::Promise,
        Category::Help,
        Category::WrongNumber,
        Category::ThirdParty,
        Category::Hangup,
        Category::Unknown,
    ];

    /// Wire representation of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ignore => "ignore",
            Category::Promise => "promise",
            Category::Help => "help",
            Category::WrongNumber => "wrong_number",
            Category::ThirdParty => "third_party",
            Category::Hangup => "hangup",
            Category::Unknown => "unknown",
        }
    }
}

/// A debtor record, created server-side from an uploaded spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    /// Full name.
    pub fio: String,
    /// National identification number.
    pub iin: String,
    pub creditor: String,
    /// Outstanding debt amount, in tenge.
    pub amount: f64,
    pub days_overdue: i64,
    pub phone: String,
    pub status: ClientStatus,
    /// Outcome of the last call, once one was classified.
    #[serde(default)]
    pub category: Option<Category>,
    pub created_at: String,
    /// Set only once the record reaches `completed` or `failed`.
    #[serde(default)]
    pub processed_at: Option<String>,
    /// Call records, populated by the single-client endpoint only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub call_records: Vec<CallRecord>,
}

/// Free-form call metadata produced by the classifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallMetadata {
    #[serde(default)]
    pub promised_date: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub matched_keywords: Option<Vec<String>>,
}

/// A single outbound call made for a client. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub id: i64,
    pub client_id: i64,
    /// Synthesized prompt text that was played to the debtor.
    #[serde(default)]
    pub tts_text: Option<String>,
    /// Recognized speech from the debtor's reply.
    #[serde(default)]
    pub transcript: Option<String>,
    /// Detected spoken language ("ru" or "kk").
    #[serde(default)]
    pub detected_language: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    /// Classifier confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default, alias = "call_metadata")]
    pub metadata: CallMetadata,
    pub created_at: String,
}

/// A call record widened with a snapshot of its client, for list display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecordWithClient {
    #[serde(flatten)]
    pub record: CallRecord,
    pub client: Client,
}

/// Uniform paginated response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    #[serde(alias = "page_size")]
    pub limit: i64,
}

impl<T> Page<T> {
    /// Total number of pages implied by `total` and `limit`, never below 1.
    pub fn total_pages(&self) -> i64 {
        if self.limit <= 0 {
            return 1;
        }
        ((self.total + self.limit - 1) / self.limit).max(1)
    }
}

/// Result of a spreadsheet upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: String,
    /// Debtor records created from the file.
    #[serde(default)]
    pub added_count: i64,
    /// Rows skipped as duplicates or parse errors.
    #[serde(default)]
    pub error_count: i64,
}

/// Result of triggering a call for a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub call_record: Option<CallRecord>,
    /// URL of the synthesized prompt audio, when the backend exposes one.
    #[serde(default)]
    pub tts_audio_url: Option<String>,
}

/// Aggregate client counters from the statistics endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_clients: i64,
    pub completed: i64,
    pub processing: i64,
    pub failed: i64,
    pub pending: i64,
    /// Percentage of completed clients over the whole base, 0 when empty.
    pub success_rate: f64,
}

/// One day of call activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: String,
    pub count: i64,
}

/// Payload of the statistics endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsData {
    pub summary: AnalyticsSummary,
    /// Call counts per category key. Keys are kept as raw strings so new
    /// classifier categories surface instead of being dropped.
    #[serde(default)]
    pub categories: BTreeMap<String, i64>,
    #[serde(default)]
    pub daily_activity: Vec<DailyActivity>,
}

/// Query parameters for the clients listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientQuery {
    pub page: i64,
    pub limit: i64,
    pub status: Option<String>,
    pub category: Option<String>,
}

impl ClientQuery {
    /// Listing for a specific page with the default page size.
    pub fn page(page: i64) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// Query-string pairs in a stable order.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(status) = &self.status {
            params.push(("status", status.clone()));
        }
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        params
    }
}

impl Default for ClientQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 25,
            status: None,
            category: None,
        }
    }
}

/// Query parameters for the call history listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub page: i64,
    pub limit: i64,
}

impl HistoryQuery {
    /// History for a specific page with the default page size.
    pub fn page(page: i64) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// Query-string pairs in a stable order.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_decodes_to_unknown() {
        let category: Category = serde_json::from_str("\"escalated\"").unwrap();
        assert_eq!(category, Category::Unknown);
    }

    #[test]
    fn known_category_round_trips() {
        let category: Category = serde_json::from_str("\"wrong_number\"").unwrap();
        assert_eq!(category, Category::WrongNumber);
        assert_eq!(
            serde_json::to_string(&category).unwrap(),
            "\"wrong_number\""
        );
    }

    #[test]
    fn page_envelope_accepts_page_size_alias() {
        let page: Page<i64> = serde_json::from_str(
            r#"{"items": [1, 2], "total": 47, "page": 1, "page_size": 25}"#,
        )
        .unwrap();
        assert_eq!(page.limit, 25);
        assert_eq!(page.total_pages(), 2);
    }

    #[test]
    fn total_pages_never_below_one() {
        let empty = Page::<i64> {
            items: vec![],
            total: 0,
            page: 1,
            limit: 25,
        };
        assert_eq!(empty.total_pages(), 1);
    }

    #[test]
    fn call_record_accepts_metadata_alias() {
        let record: CallRecord = serde_json::from_str(
            r#"{
                "id": 7,
                "client_id": 3,
                "transcript": "перезвоните позже",
                "category": "promise",
                "confidence": 0.91,
                "call_metadata": {"promised_date": "2025-09-01"},
                "created_at": "2025-08-20T10:00:00"
            }"#,
        )
        .unwrap();
        assert_eq!(record.metadata.promised_date.as_deref(), Some("2025-09-01"));
        assert_eq!(record.category, Some(Category::Promise));
    }

    #[test]
    fn client_query_params_include_filters_when_set() {
        let query = ClientQuery {
            status: Some("pending".to_string()),
            ..ClientQuery::default()
        };
        let params = query.to_params();
        assert_eq!(params[0], ("page", "1".to_string()));
        assert_eq!(params[1], ("limit", "25".to_string()));
        assert_eq!(params[2], ("status", "pending".to_string()));
    }
}
