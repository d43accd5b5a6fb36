//! Debtor base: listing, detail, upload and processing.

use askama::Template;
use axum::extract::{Multipart, Path, Query, State};
use axum::response::Redirect;
use serde::Deserialize;
use tracing::info;

use collect_api::{CallRecord, Client, ClientQuery, ClientStatus, UploadResponse};

use crate::error::{api_user_message, ConsoleError, Result};
use crate::format::{format_amount, format_datetime};
use crate::labels::{status_badge, typed_category_badge, Badge};
use crate::page::{redirect_with_notice, Notice, NoticeParams, PageMeta, Pagination};
use crate::state::AppState;

/// Client-side ceiling for spreadsheet uploads.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const PAGE_SIZE: i64 = 25;

/// Clients page template.
#[derive(Template)]
#[template(path = "clients.html")]
pub struct ClientsTemplate {
    pub meta: PageMeta,
    pub rows: Vec<ClientRow>,
    pub total: i64,
    pub pagination: Pagination,
}

/// One row of the clients table.
pub struct ClientRow {
    pub id: i64,
    pub fio: String,
    pub iin: String,
    pub creditor: String,
    pub amount: String,
    pub days_overdue: i64,
    pub long_overdue: bool,
    pub phone: String,
    pub status: Badge,
    pub category: Option<Badge>,
    pub can_process: bool,
    pub page: i64,
}

/// Client detail page template.
#[derive(Template)]
#[template(path = "client_detail.html")]
pub struct ClientDetailTemplate {
    pub meta: PageMeta,
    pub client: ClientView,
    pub records: Vec<CallRecordView>,
}

/// Detail view of one client.
pub struct ClientView {
    pub id: i64,
    pub fio: String,
    pub iin: String,
    pub creditor: String,
    pub amount: String,
    pub days_overdue: i64,
    pub phone: String,
    pub status: Badge,
    pub category: Option<Badge>,
    pub can_process: bool,
    pub created_at: String,
    pub processed_at: Option<String>,
}

/// One call record on the detail page.
pub struct CallRecordView {
    pub tts_text: String,
    pub transcript: String,
    pub language: String,
    pub badge: Option<Badge>,
    pub confidence: String,
    pub promised_date: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct ClientsParams {
    pub page: Option<i64>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub notice: Option<String>,
    pub kind: Option<String>,
}

impl ClientsParams {
    fn notice(&self) -> Option<Notice> {
        NoticeParams {
            notice: self.notice.clone(),
            kind: self.kind.clone(),
        }
        .into_notice()
    }
}

#[derive(Debug, Deserialize)]
pub struct ProcessForm {
    pub page: Option<i64>,
}

/// Render the clients listing page.
pub async fn clients_page(
    State(state): State<AppState>,
    Query(params): Query<ClientsParams>,
) -> Result<ClientsTemplate> {
    let page = params.page.unwrap_or(1).max(1);
    let query = ClientQuery {
        page,
        limit: PAGE_SIZE,
        status: params.status.clone(),
        category: params.category.clone(),
    };

    let listing = state.queries.clients(&state.api, &query).await?;

    let mut extra: Vec<(&str, String)> = Vec::new();
    if let Some(status) = &params.status {
        extra.push(("status", status.clone()));
    }
    if let Some(category) = &params.category {
        extra.push(("category", category.clone()));
    }
    let pagination = Pagination::for_path("/clients", &extra, page, listing.total, PAGE_SIZE);

    let rows = listing
        .items
        .iter()
        .map(|client| client_row(client, page))
        .collect();

    Ok(ClientsTemplate {
        meta: PageMeta::new("clients", &state.settings.get(), params.notice()),
        rows,
        total: listing.total,
        pagination,
    })
}

/// Render the client detail page.
pub async fn client_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<NoticeParams>,
) -> Result<ClientDetailTemplate> {
    let client = state
        .queries
        .client(&state.api, id)
        .await
        .ok_or(ConsoleError::NotFound)??;

    let records = client.call_records.iter().map(call_record_view).collect();

    Ok(ClientDetailTemplate {
        meta: PageMeta::new("clients", &state.settings.get(), params.into_notice()),
        client: client_view(&client),
        records,
    })
}

/// Accept a debtor spreadsheet and forward it to the backend.
///
/// File type and size are checked here, before any backend call; a rejected
/// file produces exactly one notice and no upload request.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ConsoleError::Internal(err.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|err| ConsoleError::Internal(err.to_string()))?;
            upload = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let Some((filename, bytes)) = upload else {
        let notice = Notice::error("Файл не выбран");
        return Ok(redirect_with_notice("/clients", &notice));
    };

    if let Err(message) = validate_spreadsheet(&filename, bytes.len()) {
        return Ok(redirect_with_notice("/clients", &Notice::error(message)));
    }

    info!(%filename, size = bytes.len(), "Uploading debtor spreadsheet");
    match state.api.upload_spreadsheet(&filename, bytes).await {
        Ok(response) => {
            state.queries.invalidate_clients();
            Ok(redirect_with_notice("/clients", &upload_notice(&response)))
        }
        Err(err) => {
            let message = api_user_message(&err, "Ошибка загрузки файла");
            Ok(redirect_with_notice("/clients", &Notice::error(message)))
        }
    }
}

/// Trigger an outbound call for one client.
pub async fn process(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    axum::Form(form): axum::Form<ProcessForm>,
) -> Result<Redirect> {
    let back = match form.page {
        Some(page) if page > 1 => format!("/clients?page={}", page),
        _ => "/clients".to_string(),
    };

    let demo_mode = state.settings.get().demo_mode;
    match state.api.process_client(id, demo_mode).await {
        Ok(response) => {
            state.queries.invalidate_clients();
            let text = if response.message.is_empty() {
                "Клиент успешно обработан".to_string()
            } else {
                response.message
            };
            Ok(redirect_with_notice(&back, &Notice::success(text)))
        }
        Err(err) => {
            let message = api_user_message(&err, "Ошибка обработки");
            Ok(redirect_with_notice(&back, &Notice::error(message)))
        }
    }
}

/// Check a spreadsheet before it is sent anywhere.
fn validate_spreadsheet(filename: &str, size: usize) -> std::result::Result<(), String> {
    let lower = filename.to_lowercase();
    if !(lower.ends_with(".xlsx") || lower.ends_with(".xls")) {
        return Err("Поддерживаются только файлы .xlsx и .xls".to_string());
    }
    if size > MAX_UPLOAD_BYTES {
        return Err("Файл слишком большой. Максимальный размер: 10 МБ".to_string());
    }
    Ok(())
}

/// Compose the outcome notice for an upload.
fn upload_notice(response: &UploadResponse) -> Notice {
    match (response.added_count, response.error_count) {
        (0, 0) => Notice::warning("Файл пуст или не содержит новых данных"),
        (added, 0) => Notice::success(format!("Успешно загружено {} клиентов", added)),
        (0, errors) => Notice::warning(format!(
            "Пропущено {} записей (дубликаты или ошибки)",
            errors
        )),
        (added, errors) => Notice::warning(format!(
            "Загружено {} клиентов, пропущено {} записей (дубликаты или ошибки)",
            added, errors
        )),
    }
}

fn can_process(status: ClientStatus) -> bool {
    matches!(status, ClientStatus::Pending | ClientStatus::Failed)
}

fn client_row(client: &Client, page: i64) -> ClientRow {
    ClientRow {
        id: client.id,
        fio: client.fio.clone(),
        iin: client.iin.clone(),
        creditor: client.creditor.clone(),
        amount: format_amount(client.amount),
        days_overdue: client.days_overdue,
        long_overdue: client.days_overdue > 90,
        phone: client.phone.clone(),
        status: status_badge(client.status),
        category: client.category.map(typed_category_badge),
        can_process: can_process(client.status),
        page,
    }
}

fn client_view(client: &Client) -> ClientView {
    ClientView {
        id: client.id,
        fio: client.fio.clone(),
        iin: client.iin.clone(),
        creditor: client.creditor.clone(),
        amount: format_amount(client.amount),
        days_overdue: client.days_overdue,
        phone: client.phone.clone(),
        status: status_badge(client.status),
        category: client.category.map(typed_category_badge),
        can_process: can_process(client.status),
        created_at: format_datetime(&client.created_at),
        processed_at: client
            .processed_at
            .as_deref()
            .map(format_datetime),
    }
}

fn call_record_view(record: &CallRecord) -> CallRecordView {
    CallRecordView {
        tts_text: record.tts_text.clone().unwrap_or_default(),
        transcript: record.transcript.clone().unwrap_or_default(),
        language: record.detected_language.clone().unwrap_or_default(),
        badge: record.category.map(typed_category_badge),
        confidence: record
            .confidence
            .map(|value| format!("{:.0}%", value * 100.0))
            .unwrap_or_default(),
        promised_date: record.metadata.promised_date.clone(),
        created_at: format_datetime(&record.created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::NoticeKind;

    #[test]
    fn oversized_files_are_rejected_with_the_size_message() {
        let err = validate_spreadsheet("debtors.xlsx", MAX_UPLOAD_BYTES + 1).unwrap_err();
        assert_eq!(err, "Файл слишком большой. Максимальный размер: 10 МБ");
    }

    #[test]
    fn only_spreadsheet_extensions_are_accepted() {
        assert!(validate_spreadsheet("debtors.xlsx", 1024).is_ok());
        assert!(validate_spreadsheet("DEBTORS.XLS", 1024).is_ok());
        assert!(validate_spreadsheet("debtors.csv", 1024).is_err());
        assert!(validate_spreadsheet("debtors", 1024).is_err());
    }

    #[test]
    fn boundary_size_is_still_accepted() {
        assert!(validate_spreadsheet("debtors.xls", MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn empty_upload_gets_the_distinct_no_data_notice() {
        let notice = upload_notice(&UploadResponse {
            message: String::new(),
            added_count: 0,
            error_count: 0,
        });
        assert_eq!(notice.kind, NoticeKind::Warning);
        assert_eq!(notice.text, "Файл пуст или не содержит новых данных");
    }

    #[test]
    fn mixed_upload_reports_both_counts() {
        let notice = upload_notice(&UploadResponse {
            message: String::new(),
            added_count: 10,
            error_count: 2,
        });
        assert!(notice.text.contains("10"));
        assert!(notice.text.contains("2"));
    }

    #[test]
    fn only_pending_and_failed_clients_can_be_processed() {
        assert!(can_process(ClientStatus::Pending));
        assert!(can_process(ClientStatus::Failed));
        assert!(!can_process(ClientStatus::Processing));
        assert!(!can_process(ClientStatus::Completed));
    }
}
