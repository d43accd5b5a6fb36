//! Reports page and spreadsheet export.

use askama::Template;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Local;
use serde::Deserialize;
use tracing::info;

use collect_api::{ApiError, Category, ClientStatus};

use crate::error::{ConsoleError, Result};
use crate::format::export_filename;
use crate::labels::{category_label, status_label};
use crate::page::{redirect_with_notice, Notice, NoticeParams, PageMeta};
use crate::state::AppState;

const SPREADSHEET_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Reports page template.
#[derive(Template)]
#[template(path = "reports.html")]
pub struct ReportsTemplate {
    pub meta: PageMeta,
    pub statuses: Vec<SelectOption>,
    pub categories: Vec<SelectOption>,
}

/// One option of a filter select.
pub struct SelectOption {
    pub value: &'static str,
    pub label: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    pub status: Option<String>,
    pub category: Option<String>,
}

/// Render the reports page.
pub async fn reports_page(
    State(state): State<AppState>,
    Query(params): Query<NoticeParams>,
) -> ReportsTemplate {
    let statuses = ClientStatus::ALL
        .iter()
        .map(|status| SelectOption {
            value: status.as_str(),
            label: status_label(status.as_str()).to_string(),
        })
        .collect();
    let categories = Category::ALL
        .iter()
        .map(|category| SelectOption {
            value: category.as_str(),
            label: category_label(category.as_str()).to_string(),
        })
        .collect();

    ReportsTemplate {
        meta: PageMeta::new("reports", &state.settings.get(), params.into_notice()),
        statuses,
        categories,
    }
}

/// Stream the export spreadsheet back as a browser download.
pub async fn export(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<Response> {
    // Empty select values mean "no filter".
    let status = params.status.as_deref().filter(|value| !value.is_empty());
    let category = params.category.as_deref().filter(|value| !value.is_empty());

    let bytes = match state.api.export_results(status, category).await {
        Ok(bytes) => bytes,
        Err(ApiError::Status { detail, .. }) => {
            // The backend answers 404 when the filters match nothing; send
            // the operator back to the form instead of a broken download.
            let notice = Notice::error(detail);
            return Ok(redirect_with_notice("/reports", &notice).into_response());
        }
        Err(err) => return Err(ConsoleError::Api(err)),
    };

    let filename = export_filename(status, category, Local::now().naive_local());
    info!(%filename, size = bytes.len(), "Export downloaded");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(SPREADSHEET_MIME),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
            .map_err(|err| ConsoleError::Internal(err.to_string()))?,
    );

    Ok((StatusCode::OK, headers, bytes).into_response())
}
