//! Typed client for the collection dialer backend.
//!
//! This crate wraps the backend REST API (`/api/v1`) that performs spreadsheet
//! parsing, outbound call placement, speech recognition and result
//! classification. Everything here is request shaping: DTOs, URL construction
//! and error classification. No retries, no caching — callers own both.
//!
//! # Example
//!
//! ```no_run
//! use collect_api::{ApiConfig, ClientQuery, CollectClient};
//!
//! # async fn example() -> Result<(), collect_api::ApiError> {
//! let client = CollectClient::new(ApiConfig::default())?;
//!
//! let page = client.list_clients(&ClientQuery::default()).await?;
//! println!("{} debtors total", page.total);
//!
//! let result = client.process_client(42, true).await?;
//! println!("call placed: {}", result.message);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::CollectClient;
pub use config::ApiConfig;
pub use error::ApiError;
pub use types::*;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
