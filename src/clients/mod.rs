//! HTTP layer for Mailman REST API communication.
//!
//! # Overview
//!
//! - [`Connection`]: performs authenticated calls against the versioned API root
//! - [`HttpMethod`]: supported HTTP methods
//! - [`FormData`]: the form-encoded request body used for every write
//! - [`HttpResponse`]: status, headers and decoded JSON body of a 2xx response
//! - [`HttpError`]: everything a call can fail with, split into
//!   [`HttpResponseError`] (the server said no) and [`ConnectionFailure`]
//!   (the server could not be reached)
//!
//! # Method Inference
//!
//! [`Connection::call`] uses `GET` when no data is given and `POST` when
//! data is given, unless a method is passed explicitly.
//!
//! # Retry Behavior
//!
//! None. Every failure is returned to the caller, who decides whether to
//! retry, log or surface it.

mod connection;
mod errors;
mod http_request;
mod http_response;

pub use connection::{Connection, CLIENT_VERSION};
pub use errors::{ConnectionFailure, HttpError, HttpResponseError};
pub use http_request::{FormData, HttpMethod, FORM_CONTENT_TYPE};
pub use http_response::HttpResponse;

pub(crate) use http_request::encode_pairs;
