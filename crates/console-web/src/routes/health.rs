//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: String,
    /// Whether the collection backend answered its own health check.
    pub backend_reachable: bool,
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let backend_reachable = state.api.health_check().await.unwrap_or(false);
    Json(Health {
        status: "ok".to_string(),
        backend_reachable,
    })
}
