//! Resource kind policies and the resource factory contract.
//!
//! Every Mailman resource kind is a zero-sized marker type implementing
//! [`ResourceKind`]. The trait's associated constants describe which fields
//! are visible and writable; the generic engine in
//! [`RestBase`](crate::rest::RestBase) enforces them.
//!
//! # Implementing a Kind
//!
//! ```rust,ignore
//! use mailman_client::rest::{ResourceKind, RestObject};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Clone, Deserialize)]
//! pub struct QueueFields {
//!     pub name: String,
//!     pub directory: String,
//! }
//!
//! #[derive(Debug)]
//! pub enum QueueKind {}
//!
//! impl ResourceKind for QueueKind {
//!     type Fields = QueueFields;
//!     const NAME: &'static str = "Queue";
//!     const PROPERTIES: Option<&'static [&'static str]> = Some(&["name", "directory", "files"]);
//! }
//!
//! pub type Queue = RestObject<QueueKind>;
//! ```

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::clients::Connection;
use crate::rest::ResourceError;

/// Field policy and typed view of one kind of REST resource.
pub trait ResourceKind: Send + Sync + 'static {
    /// The typed data-transfer object the resource's JSON decodes into.
    type Fields: DeserializeOwned;

    /// Name used in error messages and logs (e.g. `"MailingList"`).
    const NAME: &'static str;

    /// The externally visible fields.
    ///
    /// When set, fields outside the list are unknown, and listed fields that
    /// the server omitted read as `null`. When `None`, the server's data
    /// defines the visible fields.
    const PROPERTIES: Option<&'static [&'static str]> = None;

    /// Fields that may be written. `None` means every field not in
    /// [`READ_ONLY_PROPERTIES`](Self::READ_ONLY_PROPERTIES).
    const WRITABLE_PROPERTIES: Option<&'static [&'static str]> = None;

    /// Fields that can never be written.
    const READ_ONLY_PROPERTIES: &'static [&'static str] = &["self_link"];

    /// Send a `PATCH` immediately after every field change.
    const AUTOSAVE: bool = false;

    /// Returns `true` if `key` is externally visible.
    #[must_use]
    fn is_visible(key: &str) -> bool {
        Self::PROPERTIES.map_or(true, |properties| properties.contains(&key))
    }

    /// Rejects writes to read-only or non-writable fields.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ReadOnlyField`] if `key` cannot be written.
    fn check_writable(key: &str) -> Result<(), ResourceError> {
        let read_only = Self::READ_ONLY_PROPERTIES.contains(&key)
            || Self::WRITABLE_PROPERTIES.is_some_and(|writable| !writable.contains(&key));
        if read_only {
            return Err(ResourceError::ReadOnlyField {
                resource: Self::NAME,
                field: key.to_string(),
            });
        }
        Ok(())
    }
}

/// A kind whose endpoint returns a `{"entries": [...]}` collection.
pub trait ListKind: ResourceKind {
    /// The resource each entry is turned into.
    type Item: Resource;
}

/// Something that can be built from a connection, a URL and optional data.
///
/// This is the factory used by [`Page`](crate::rest::Page) and
/// [`RestList`](crate::rest::RestList) to materialize entries.
pub trait Resource: Sized {
    /// Builds the resource. With `data` present no fetch will be needed to
    /// read it.
    fn from_parts(connection: Arc<Connection>, url: String, data: Option<Map<String, Value>>)
        -> Self;

    /// Builds the resource from one collection entry, using its `self_link`
    /// as the URL.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnexpectedBody`] if the entry is not an
    /// object with a string `self_link`.
    fn from_entry(connection: &Arc<Connection>, entry: &Value) -> Result<Self, ResourceError> {
        let data = entry
            .as_object()
            .ok_or_else(|| ResourceError::UnexpectedBody {
                url: connection.api_root().to_string(),
                expected: "collection entries to be JSON objects",
            })?;
        let url = data
            .get("self_link")
            .and_then(Value::as_str)
            .ok_or_else(|| ResourceError::UnexpectedBody {
                url: connection.api_root().to_string(),
                expected: "collection entries with a self_link",
            })?
            .to_string();
        Ok(Self::from_parts(
            Arc::clone(connection),
            url,
            Some(data.clone()),
        ))
    }
}
