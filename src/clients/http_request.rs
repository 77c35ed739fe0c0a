//! HTTP request types.
//!
//! This module provides [`HttpMethod`] and [`FormData`], the form-encoded
//! request body every write to the REST API uses.

use std::fmt;

use serde_json::{Map, Value};

/// HTTP methods used by the Mailman REST API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Retrieve a resource.
    Get,
    /// Create a resource or trigger an action.
    Post,
    /// Replace a resource.
    Put,
    /// Partially update a resource.
    Patch,
    /// Remove a resource.
    Delete,
}

impl HttpMethod {
    /// Returns the upper-case method name as sent on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Picks the method for a call: `explicit` if given, otherwise `POST`
    /// when there is a body and `GET` when there is none.
    #[must_use]
    pub const fn infer(explicit: Option<Self>, has_body: bool) -> Self {
        match explicit {
            Some(method) => method,
            None if has_body => Self::Post,
            None => Self::Get,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Patch => Self::PATCH,
            HttpMethod::Delete => Self::DELETE,
        }
    }
}

/// Content type of every request body sent to the REST API.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An ordered, `application/x-www-form-urlencoded` request body.
///
/// Sequence values become repeated keys, booleans are rendered as
/// `True`/`False` (what Mailman's validators expect) and `null` values are
/// left out.
///
/// # Example
///
/// ```rust
/// use mailman_client::clients::FormData;
/// use serde_json::json;
///
/// let form = FormData::new()
///     .field("subscriber", "anne@example.com")
///     .field("pre_verified", true)
///     .field("roles", json!(["owner", "moderator"]));
///
/// assert_eq!(
///     form.to_urlencoded(),
///     "subscriber=anne%40example.com&pre_verified=True&roles=owner&roles=moderator"
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a form from a JSON object, one field per key.
    #[must_use]
    pub fn from_map(map: &Map<String, Value>) -> Self {
        map.iter()
            .fold(Self::new(), |form, (key, value)| form.field(key, value.clone()))
    }

    /// Adds a field, expanding arrays into repeated keys.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(key, value.into());
        self
    }

    /// Adds a field only when `value` is `Some`.
    #[must_use]
    pub fn optional_field<V: Into<Value>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.field(key, value),
            None => self,
        }
    }

    fn push(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    self.push(key.clone(), item);
                }
            }
            other => {
                let rendered = render_scalar(other);
                self.pairs.push((key, rendered));
            }
        }
    }

    /// Returns the encoded `(key, value)` pairs in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Returns `true` if the form has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the URL-encoded body.
    #[must_use]
    pub fn to_urlencoded(&self) -> String {
        encode_pairs(self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

fn render_scalar(value: Value) -> String {
    match value {
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// URL-encodes `(key, value)` pairs joined with `&`.
pub(crate) fn encode_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .into_iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
