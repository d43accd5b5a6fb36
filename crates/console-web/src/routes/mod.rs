//! Route handlers for the operator console.

pub mod analytics;
pub mod clients;
pub mod dashboard;
pub mod health;
pub mod history;
pub mod reports;
pub mod settings;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Request body ceiling for spreadsheet uploads: the 10 MiB file limit plus
/// headroom for multipart framing.
const UPLOAD_BODY_LIMIT: usize = 12 * 1024 * 1024;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // HTML pages
        .route("/", get(dashboard::dashboard_page))
        .route("/clients", get(clients::clients_page))
        .route("/clients/:id", get(clients::client_page))
        .route("/history", get(history::history_page))
        .route("/reports", get(reports::reports_page))
        .route("/analytics", get(analytics::analytics_page))
        .route(
            "/settings",
            get(settings::settings_page).post(settings::update),
        )
        .route("/settings/reset", post(settings::reset))
        // Actions
        .route(
            "/clients/upload",
            post(clients::upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/clients/:id/process", post(clients::process))
        .route("/reports/export", get(reports::export))
        // Health check
        .route("/health", get(health::health))
        // API endpoints
        .route("/api/statistics", get(analytics::statistics_api))
}
