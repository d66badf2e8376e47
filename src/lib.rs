//! Logz.io Provider
//!
//! Data sources for the Logz.io log-management API, exposed through a small
//! provider surface in the spirit of
//! [terraform-plugin-go](https://github.com/hashicorp/terraform-plugin-go).
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **`logzio_log_shipping_token` data source**: looks a token up by id, or by
//!   exact name and enabled state with a paged search
//! - **Token client**: a `reqwest` client for `/v1/log-shipping/tokens`, behind
//!   the [`TokenSource`] trait so the lookup logic can run against anything
//! - **ProviderService trait**: schema, configuration and data source reads
//! - **Schema & validation**: attribute schemas and diagnostics
//! - **Logging**: `tracing` setup writing to stderr
//! - **Testing**: a provider harness and an in-memory token store
//!
//! # Quick Start
//!
//! ```ignore
//! use logzio_provider::{init_logging, LogzioProvider, ProviderService};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!
//!     let provider = LogzioProvider::new();
//!     provider.configure(json!({"api_token": "...", "region": "eu"})).await?;
//!
//!     let state = provider
//!         .read_data_source(
//!             "logzio_log_shipping_token",
//!             json!({"name": "svc-prod", "enabled": true}),
//!         )
//!         .await?;
//!     println!("token id {}", state["id"]);
//!     Ok(())
//! }
//! ```
//!
//! # Lookup rules
//!
//! - `token_id` set: one `GET`, whatever the outcome. A failed id lookup is
//!   never retried by name.
//! - otherwise `name` and `enabled` set: pages of 25 are searched in order and
//!   the first exact name match wins.
//! - otherwise the read fails as not found without calling the API.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod data_source;
pub mod error;
pub mod logging;
pub mod provider;
pub mod resolver;
pub mod schema;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use client::{LogShippingTokensClient, TokenSource};
pub use config::ProviderConfig;
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::{LogzioProvider, ProviderMetadata, ProviderService};
pub use resolver::{LookupRequest, TokenResolver};
pub use schema::ProviderSchema;
pub use types::{
    LogShippingToken, RetrieveLogShippingTokensRequest, RetrieveLogShippingTokensResponse,
    PAGE_SIZE,
};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
