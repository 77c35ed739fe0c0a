//! Dirty tracking for partial updates.
//!
//! This module provides [`PendingChanges`], the buffer of field writes a
//! resource has accepted but not yet sent. Only buffered fields go into the
//! `PATCH` request, so concurrent edits to other fields are not overwritten.
//!
//! # How It Works
//!
//! Every accepted write is recorded by field name; writing the same field
//! twice keeps the last value. A successful save clears the buffer, a
//! failed save leaves it intact so the caller can retry.
//!
//! # Example
//!
//! ```rust
//! use mailman_client::rest::PendingChanges;
//! use serde_json::json;
//!
//! let mut changes = PendingChanges::new();
//! assert!(changes.is_empty());
//!
//! changes.insert("display_name", json!("Ant Hill"));
//! changes.insert("display_name", json!("Ant Colony"));
//! changes.insert("advertised", json!(false));
//!
//! assert_eq!(changes.len(), 2);
//! assert_eq!(
//!     changes.to_form().to_urlencoded(),
//!     "advertised=False&display_name=Ant%20Colony"
//! );
//! ```

use serde_json::{Map, Value};

use crate::clients::FormData;

/// Field writes waiting to be sent to the server.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PendingChanges {
    fields: Map<String, Value>,
}

impl PendingChanges {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a write, replacing any earlier write to the same field.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// Drops a buffered write.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Returns the buffered value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns `true` if `key` has a buffered write.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Returns `true` if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of buffered fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates over buffered field names and values.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Discards every buffered write.
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Returns the buffered writes as a `PATCH` form body.
    ///
    /// A buffered `null` clears the field and is sent as an empty value.
    #[must_use]
    pub fn to_form(&self) -> FormData {
        self.fields.iter().fold(FormData::new(), |form, (key, value)| match value {
            Value::Null => form.field(key.as_str(), ""),
            other => form.field(key.as_str(), other.clone()),
        })
    }
}
