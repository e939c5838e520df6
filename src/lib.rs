//! # MerchantOS API Rust Client
//!
//! An async client for the MerchantOS point-of-sale REST API, with typed
//! configuration, Basic authentication, rate-limit handling and a dynamic
//! resource object model.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - Validated newtypes for credentials and the API host
//! - An account-scoped [`Connection`](clients::Connection) that resolves the
//!   account once and retries when the server answers 503
//! - Resource accessors that find, create, count and lazily enumerate records
//! - Resource objects with lazily inflated nested resources, buffered writes
//!   and read-only enforcement
//!
//! ## Quick Start
//!
//! ```rust
//! use merchantos_api::{ApiHost, ApiToken, ClientConfig, UserId};
//!
//! let config = ClientConfig::builder()
//!     .host(ApiHost::new("api.merchantos.com").unwrap())
//!     .user_id(UserId::new("joey@example.com").unwrap())
//!     .api_token(ApiToken::new("apikey").unwrap())
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Working With Resources
//!
//! ```rust,ignore
//! use merchantos_api::ApiClient;
//! use merchantos_api::rest::{EnumerateParams, FilterSet};
//!
//! let client = ApiClient::connect(&config).await?;
//! let sales = client.resource("Sale");
//!
//! let mut pages = sales.enumerate(EnumerateParams::new().limit(50));
//! while let Some(sale) = pages.next().await {
//!     let mut sale = sale?;
//!     let url = sale.url().to_string();
//!     if let Some(lines) = sale.get("SaleLines").await?.as_resources() {
//!         println!("{url} has {} lines", lines.len());
//!     }
//! }
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and installs no subscriber. Request
//! lines and statuses are logged at `debug`, the resolved account root and
//! saves at `info`, and rate-limit backoffs at `warn`.

pub mod auth;
mod client;
pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use client::ApiClient;
pub use config::{ApiHost, ApiToken, ClientConfig, ClientConfigBuilder, UserId};
pub use error::ConfigError;

// Re-export HTTP types
pub use clients::{
    Connection, EmptyResponseError, HttpClient, HttpError, HttpMethod, HttpRequest,
    HttpResponse, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};

// Re-export the resource model
pub use rest::{
    EnumerateParams, FilterSet, Mapping, ResourceAccessor, ResourceError, ResourceObject,
    ResourceRegistry, ResourceType, SubResource,
};
