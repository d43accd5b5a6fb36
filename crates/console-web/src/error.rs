//! Error types for the console.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use collect_api::ApiError;
use query_cache::QueryError;

/// Errors that can occur while serving console requests.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// A direct backend call failed.
    #[error("backend error: {0}")]
    Api(#[from] ApiError),

    /// A cached read failed.
    #[error("{0}")]
    Query(#[from] QueryError<ApiError>),

    /// Input rejected before any backend call.
    #[error("{0}")]
    Validation(String),

    /// The requested record does not exist.
    #[error("not found")]
    NotFound,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ConsoleError::Api(err) => classify_api(err),
            ConsoleError::Query(QueryError::Fetch(err)) => classify_api(err),
            ConsoleError::Query(QueryError::Aborted) => {
                tracing::error!("Query fetch task aborted");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Запрос был прерван, попробуйте ещё раз".to_string(),
                )
            }
            ConsoleError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            ConsoleError::NotFound => (StatusCode::NOT_FOUND, "Запись не найдена".to_string()),
            ConsoleError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

fn classify_api(err: &ApiError) -> (StatusCode, String) {
    match err {
        ApiError::Status { status, detail } if *status == 404 => {
            (StatusCode::NOT_FOUND, detail.clone())
        }
        ApiError::Status { detail, .. } => (StatusCode::BAD_GATEWAY, detail.clone()),
        ApiError::Http(inner) => {
            tracing::error!("Backend unreachable: {}", inner);
            (
                StatusCode::BAD_GATEWAY,
                "Нет соединения с backend сервером".to_string(),
            )
        }
        ApiError::InvalidBaseUrl(url) => (
            StatusCode::BAD_GATEWAY,
            format!("Некорректный адрес backend: {url}"),
        ),
    }
}

/// The message shown to the operator for a failed mutation: the server's
/// detail string verbatim when one exists, otherwise the given fallback.
pub fn api_user_message(err: &ApiError, fallback: &str) -> String {
    match err.detail() {
        Some(detail) => detail.to_string(),
        None => fallback.to_string(),
    }
}

/// Result type for console handlers.
pub type Result<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_detail_is_surfaced_verbatim() {
        let err = ApiError::Status {
            status: 400,
            detail: "Клиент уже обрабатывается".to_string(),
        };
        assert_eq!(
            api_user_message(&err, "Ошибка обработки"),
            "Клиент уже обрабатывается"
        );
    }

    #[test]
    fn network_failures_use_the_fallback_message() {
        let err = ApiError::InvalidBaseUrl("nonsense".to_string());
        assert_eq!(api_user_message(&err, "Ошибка обработки"), "Ошибка обработки");
    }
}
