//! Operator web console for the collection auto-dialer.
//!
//! Server-rendered console over the backend REST API: debtor base, call
//! history, analytics, exports and operator settings.

mod config;
mod error;
mod format;
mod labels;
mod page;
mod queries;
mod routes;
mod state;

use collect_api::{ApiConfig, CollectClient};
use settings::SettingsStore;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting operator console");

    // Operator settings supply the backend address for all requests.
    let settings_store = SettingsStore::open(&config.settings_path);
    let api = CollectClient::new(ApiConfig::new(settings_store.get().api_url))?;

    // Retarget the API client whenever the backend address setting changes,
    // so existing handlers pick up the new address without being rebuilt.
    {
        let api = api.clone();
        let mut updates = settings_store.subscribe();
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let api_url = updates.borrow_and_update().api_url.clone();
                match api.set_base_url(&api_url) {
                    Ok(()) => info!(%api_url, "API client retargeted"),
                    Err(err) => warn!("Ignoring invalid API URL from settings: {}", err),
                }
            }
        });
    }

    // Build application state and background pollers
    let state = AppState::new(api.clone(), settings_store);
    state.queries.spawn_pollers(&api);

    // Build router
    let app = routes::router()
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state);

    // Start server
    info!(addr = %config.addr, "Operator console listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
