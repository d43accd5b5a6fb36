//! Call history page.

use askama::Template;
use axum::extract::{Query, State};
use serde::Deserialize;

use collect_api::{CallRecordWithClient, Category, HistoryQuery};

use crate::error::Result;
use crate::format::{format_datetime, snippet};
use crate::labels::{typed_category_badge, Badge};
use crate::page::{Notice, NoticeParams, PageMeta, Pagination};
use crate::state::AppState;

const PAGE_SIZE: i64 = 20;

/// Call history page template.
#[derive(Template)]
#[template(path = "history.html")]
pub struct HistoryTemplate {
    pub meta: PageMeta,
    pub summary: HistorySummary,
    pub rows: Vec<HistoryRow>,
    pub pagination: Pagination,
}

/// Summary cards over the listed calls.
pub struct HistorySummary {
    pub total: i64,
    pub classified: usize,
    pub awaiting: usize,
    pub unresolved: usize,
}

/// One row of the history table.
pub struct HistoryRow {
    pub client_id: i64,
    pub fio: String,
    pub phone: String,
    pub transcript: String,
    pub language: String,
    pub badge: Option<Badge>,
    pub confidence: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub page: Option<i64>,
    pub notice: Option<String>,
    pub kind: Option<String>,
}

impl HistoryParams {
    fn notice(&self) -> Option<Notice> {
        NoticeParams {
            notice: self.notice.clone(),
            kind: self.kind.clone(),
        }
        .into_notice()
    }
}

/// Render the call history page.
pub async fn history_page(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<HistoryTemplate> {
    let page = params.page.unwrap_or(1).max(1);
    let query = HistoryQuery {
        page,
        limit: PAGE_SIZE,
    };

    let listing = state.queries.history(&state.api, &query).await?;

    let summary = summarize(listing.total, &listing.items);
    let pagination = Pagination::for_path("/history", &[], page, listing.total, PAGE_SIZE);
    let rows = listing.items.iter().map(history_row).collect();

    Ok(HistoryTemplate {
        meta: PageMeta::new("history", &state.settings.get(), params.notice()),
        summary,
        rows,
        pagination,
    })
}

/// Summary counters over the records on the current page.
fn summarize(total: i64, items: &[CallRecordWithClient]) -> HistorySummary {
    let classified = items
        .iter()
        .filter(|item| matches!(item.record.category, Some(category) if category != Category::Unknown))
        .count();
    let awaiting = items
        .iter()
        .filter(|item| item.record.transcript.as_deref().unwrap_or("").is_empty())
        .count();
    let unresolved = items
        .iter()
        .filter(|item| item.record.category == Some(Category::Unknown))
        .count();

    HistorySummary {
        total,
        classified,
        awaiting,
        unresolved,
    }
}

fn history_row(item: &CallRecordWithClient) -> HistoryRow {
    HistoryRow {
        client_id: item.client.id,
        fio: item.client.fio.clone(),
        phone: item.client.phone.clone(),
        transcript: snippet(item.record.transcript.as_deref().unwrap_or("—"), 80),
        language: item
            .record
            .detected_language
            .clone()
            .unwrap_or_default()
            .to_uppercase(),
        badge: item.record.category.map(typed_category_badge),
        confidence: item
            .record
            .confidence
            .map(|value| format!("{:.0}%", value * 100.0))
            .unwrap_or_else(|| "—".to_string()),
        created_at: format_datetime(&item.record.created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collect_api::{CallMetadata, CallRecord, Client, ClientStatus};

    fn item(category: Option<Category>, transcript: Option<&str>) -> CallRecordWithClient {
        CallRecordWithClient {
            record: CallRecord {
                id: 1,
                client_id: 1,
                tts_text: None,
                transcript: transcript.map(str::to_string),
                detected_language: Some("ru".to_string()),
                category,
                confidence: Some(0.8),
                metadata: CallMetadata::default(),
                created_at: "2025-08-07T10:00:00".to_string(),
            },
            client: Client {
                id: 1,
                fio: "Тест".to_string(),
                iin: "000".to_string(),
                creditor: "Bank".to_string(),
                amount: 1000.0,
                days_overdue: 10,
                phone: "+7700".to_string(),
                status: ClientStatus::Completed,
                category,
                created_at: "2025-08-01T10:00:00".to_string(),
                processed_at: None,
                call_records: vec![],
            },
        }
    }

    #[test]
    fn summary_counts_classified_awaiting_and_unresolved() {
        let items = vec![
            item(Some(Category::Promise), Some("оплачу")),
            item(Some(Category::Unknown), Some("...")),
            item(None, None),
            item(None, Some("")),
        ];
        let summary = summarize(42, &items);
        assert_eq!(summary.total, 42);
        assert_eq!(summary.classified, 1);
        assert_eq!(summary.awaiting, 2);
        assert_eq!(summary.unresolved, 1);
    }
}
