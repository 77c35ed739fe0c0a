//! HTTP-specific error types.
//!
//! # Error Handling
//!
//! - [`HttpResponseError`]: the server answered with a non-2xx status
//! - [`ConnectionFailure`]: the server could not be reached at all
//! - [`HttpError`]: unified error type for everything [`Connection::call`]
//!   can return
//!
//! Callers branch on the variant to tell "the server rejected this" from
//! "the server was unreachable":
//!
//! ```rust,ignore
//! use mailman_client::clients::HttpError;
//!
//! match connection.call("users/anne@example.com", None, None).await {
//!     Ok(response) => println!("{:?}", response.body),
//!     Err(HttpError::Response(e)) if e.code == 404 => println!("no such user"),
//!     Err(HttpError::Response(e)) => println!("API error {}: {}", e.code, e.body),
//!     Err(HttpError::Connection(e)) => println!("Mailman is down: {e}"),
//!     Err(e) => println!("{e}"),
//! }
//! ```
//!
//! [`Connection::call`]: crate::clients::Connection::call

use std::collections::HashMap;

use thiserror::Error;

/// Error returned when a request receives a non-successful response.
///
/// Carries the status code, the raw body text and the response headers so
/// that callers can branch on the code and show the body for diagnostics.
///
/// # Example
///
/// ```rust
/// use mailman_client::clients::HttpResponseError;
/// use std::collections::HashMap;
///
/// let error = HttpResponseError {
///     code: 404,
///     url: "http://localhost:8001/3.0/users/x@example.com".to_string(),
///     body: r#"{"title": "404 Not Found"}"#.to_string(),
///     headers: HashMap::new(),
/// };
///
/// assert!(error.to_string().starts_with("HTTP 404"));
/// ```
#[derive(Debug, Clone, Error)]
#[error("HTTP {code} from {url}: {body}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// The URL that was requested.
    pub url: String,
    /// The raw response body.
    pub body: String,
    /// Response headers (lower-cased names, possibly multi-valued).
    pub headers: HashMap<String, Vec<String>>,
}

impl HttpResponseError {
    /// Returns the `title` field of a JSON error body, if there is one.
    ///
    /// Mailman Core reports errors as `{"title": "...", "description": "..."}`.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        serde_json::from_str::<serde_json::Value>(&self.body)
            .ok()?
            .get("title")?
            .as_str()
            .map(ToString::to_string)
    }

    /// Returns the `description` field of a JSON error body, if there is one.
    #[must_use]
    pub fn description(&self) -> Option<String> {
        serde_json::from_str::<serde_json::Value>(&self.body)
            .ok()?
            .get("description")?
            .as_str()
            .map(ToString::to_string)
    }
}

/// Error returned when the REST API could not be reached.
///
/// DNS failures, refused connections, timeouts and broken response streams
/// all end up here.
#[derive(Debug, Error)]
#[error("Could not connect to Mailman API at {url}")]
pub struct ConnectionFailure {
    /// The URL that was requested.
    pub url: String,
    /// The underlying transport error.
    #[source]
    pub source: reqwest::Error,
}

/// Unified error type for all HTTP-related errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A non-2xx response.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// The server could not be reached.
    #[error(transparent)]
    Connection(#[from] ConnectionFailure),

    /// A 2xx response whose non-empty body is not valid JSON.
    #[error("Invalid JSON in response from {url}: {source}")]
    InvalidJson {
        /// The URL that was requested.
        url: String,
        /// The parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The request path could not be joined onto the API root.
    #[error("Invalid request URL '{path}': {reason}")]
    InvalidUrl {
        /// The path that was passed to the connection.
        path: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl HttpError {
    /// Returns the HTTP status code for response errors.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.code),
            _ => None,
        }
    }

    /// Returns `true` if this is a transport-level failure.
    #[must_use]
    pub const fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
