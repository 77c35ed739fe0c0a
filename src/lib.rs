//! # Mailman REST Client
//!
//! A typed, asynchronous client for the GNU Mailman 3 Core REST API.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - An authenticated [`Connection`](clients::Connection) with typed HTTP errors
//! - Lazily fetched, change-tracked resources ([`RestObject`](rest::RestObject),
//!   [`RestDict`](rest::RestDict), [`RestList`](rest::RestList))
//! - Server-side pagination via [`Page`](rest::Page) and the
//!   [`paginator`] helpers
//! - Every Mailman resource kind (domains, lists, members, users, addresses,
//!   bans, held messages, queues) in [`resources`]
//! - An injected in-process [`Cache`] and the account-level
//!   [`MailmanService`]
//!
//! ## Quick Start
//!
//! ```rust
//! use mailman_client::{ApiVersion, ClientConfig};
//!
//! let config = ClientConfig::builder()
//!     .base_url("http://localhost:8001")
//!     .credentials("restadmin", "restpass")
//!     .api_version(ApiVersion::V3_0)
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Working with Resources
//!
//! Resources fetch their data on first access and buffer writes until
//! [`save`](rest::RestObject::save):
//!
//! ```rust,ignore
//! use mailman_client::{Client, ClientConfig};
//!
//! let client = Client::new(&ClientConfig::from_env()?)?;
//! let mut list = client.get_list("ants@example.com").await?;
//!
//! let mut settings = list.settings().await?;
//! settings.set("description", "All about ants").await?;
//! settings.set("advertised", false).await?;
//! settings.save().await?; // a single PATCH
//! ```
//!
//! ## Pagination
//!
//! ```rust,ignore
//! let page = client.get_user_page(25, 1).await?;
//! for user in &page {
//!     println!("{user}");
//! }
//! if page.has_next() {
//!     let next = page.next().await?;
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration, connection and cache are passed explicitly
//! - **Fail-fast validation**: configuration newtypes validate on construction
//! - **One operation at a time per resource**: lazy reads and writes take `&mut self`
//! - **Async-first**: designed for use with the Tokio runtime
//! - **No hidden retries**: every error reaches the caller

pub mod cache;
pub mod client;
pub mod clients;
pub mod config;
pub mod error;
pub mod paginator;
pub mod rest;
pub mod service;

pub use rest::resources;

// Re-export public types at crate root for convenience
pub use cache::Cache;
pub use client::Client;
pub use config::{ApiVersion, BaseUrl, ClientConfig, ClientConfigBuilder, Credentials};
pub use error::ConfigError;
pub use service::{Account, MailmanService};

// Re-export HTTP types
pub use clients::{
    Connection, ConnectionFailure, FormData, HttpError, HttpMethod, HttpResponse,
    HttpResponseError,
};

// Re-export the resource engine
pub use paginator::{paginate, PageSource, PaginatedPage, Pagination, PaginationError, Paginator};
pub use rest::{Page, ResourceError, RestDict, RestList, RestObject};
