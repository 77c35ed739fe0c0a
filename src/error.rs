//! Error types for client configuration.
//!
//! This module contains the error type returned while building a
//! [`ClientConfig`](crate::ClientConfig) or opening a
//! [`Connection`](crate::clients::Connection).
//!
//! # Example
//!
//! ```rust
//! use mailman_client::{ClientConfig, ConfigError};
//!
//! let result = ClientConfig::builder()
//!     .base_url("http://localhost:8001")
//!     .username("restadmin")
//!     .build();
//! assert!(matches!(result, Err(ConfigError::IncompleteCredentials { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur during client configuration.
///
/// Each variant carries enough context to tell the operator which setting
/// has to be fixed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The REST API base URL could not be parsed or has no `http(s)` scheme.
    #[error("Invalid Mailman REST API URL '{url}'. Expected an absolute http(s) URL such as 'http://localhost:8001'.")]
    InvalidBaseUrl {
        /// The URL that was provided.
        url: String,
    },

    /// Only one half of the Basic-Auth credentials was supplied.
    #[error("`{missing}` is required when `{given}` is given")]
    IncompleteCredentials {
        /// The credential that was provided.
        given: &'static str,
        /// The credential that is missing.
        missing: &'static str,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// The REST API version string is not recognised.
    #[error("Invalid REST API version '{version}'. Expected a version such as '3.0' or '3.1'.")]
    InvalidApiVersion {
        /// The version string that was provided.
        version: String,
    },

    /// The user agent prefix cannot be sent in an HTTP header.
    #[error("Invalid user agent prefix '{prefix}'. Only visible ASCII characters and spaces are allowed.")]
    InvalidUserAgentPrefix {
        /// The prefix that was provided.
        prefix: String,
    },

    /// The underlying HTTP client could not be created.
    #[error("Failed to initialise the HTTP client: {reason}")]
    HttpClientInit {
        /// Description of the failure reported by the HTTP stack.
        reason: String,
    },
}
