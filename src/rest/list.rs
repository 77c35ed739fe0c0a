//! Resources exposed as sequences of entries.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::clients::{Connection, HttpMethod};
use crate::rest::{ListKind, Resource, ResourceError, RestBase};

/// A REST collection whose `entries` are materialized as
/// [`ListKind::Item`] resources.
///
/// A missing `entries` field is an empty list.
pub struct RestList<K: ListKind> {
    base: RestBase<K>,
}

impl<K: ListKind> RestList<K> {
    /// Creates a list view of `url`, optionally with a cached snapshot.
    #[must_use]
    pub fn new(
        connection: Arc<Connection>,
        url: impl Into<String>,
        data: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            base: RestBase::new(connection, url, data),
        }
    }

    /// Returns the collection URL.
    #[must_use]
    pub fn url(&self) -> &str {
        self.base.url()
    }

    /// Returns `true` if a snapshot is cached.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.base.is_loaded()
    }

    /// Returns the raw entries, fetching them if needed.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn entries(&mut self) -> Result<&[Value], ResourceError> {
        let data = self.base.rest_data().await?;
        Ok(entries_of(data))
    }

    /// Returns the cached raw entries without fetching.
    #[must_use]
    pub fn cached_entries(&self) -> Option<&[Value]> {
        self.base.cached().map(entries_of)
    }

    /// Returns the number of entries.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn len(&mut self) -> Result<usize, ResourceError> {
        Ok(self.entries().await?.len())
    }

    /// Returns `true` if there are no entries.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn is_empty(&mut self) -> Result<bool, ResourceError> {
        Ok(self.entries().await?.is_empty())
    }

    /// Returns the entry at `index`, or `None` past the end.
    ///
    /// # Errors
    ///
    /// Returns the fetch error or a malformed-entry error.
    pub async fn get(&mut self, index: usize) -> Result<Option<K::Item>, ResourceError> {
        let connection = Arc::clone(self.base.connection());
        self.entries()
            .await?
            .get(index)
            .map(|entry| K::Item::from_entry(&connection, entry))
            .transpose()
    }

    /// Returns every entry as a resource.
    ///
    /// # Errors
    ///
    /// Returns the fetch error or a malformed-entry error.
    pub async fn items(&mut self) -> Result<Vec<K::Item>, ResourceError> {
        let connection = Arc::clone(self.base.connection());
        self.entries()
            .await?
            .iter()
            .map(|entry| K::Item::from_entry(&connection, entry))
            .collect()
    }

    /// Deletes the entry at `index` on the server and drops the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::IndexOutOfRange`], a malformed-entry error
    /// or the `DELETE` error.
    pub async fn remove(&mut self, index: usize) -> Result<(), ResourceError> {
        let list_url = self.base.url().to_string();
        let url = {
            let entries = self.entries().await?;
            let len = entries.len();
            let entry = entries.get(index).ok_or(ResourceError::IndexOutOfRange {
                resource: K::NAME,
                index,
                len,
            })?;
            entry
                .get("self_link")
                .and_then(Value::as_str)
                .map(ToString::to_string)
                .ok_or(ResourceError::UnexpectedBody {
                    url: list_url,
                    expected: "collection entries with a self_link",
                })?
        };
        tracing::debug!("Removing {} entry {}", K::NAME, url);
        self.base
            .connection()
            .call(&url, None, Some(HttpMethod::Delete))
            .await?;
        self.base.reset_cache();
        Ok(())
    }

    /// Deletes the whole collection on the server.
    ///
    /// # Errors
    ///
    /// Returns the `DELETE` error.
    pub async fn clear(&mut self) -> Result<(), ResourceError> {
        self.base.delete().await
    }

    /// Drops the snapshot.
    pub fn reset_cache(&mut self) {
        self.base.reset_cache();
    }

    pub(crate) const fn connection(&self) -> &Arc<Connection> {
        self.base.connection()
    }
}

fn entries_of(data: &Map<String, Value>) -> &[Value] {
    data.get("entries")
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice)
}

impl<K: ListKind> Resource for RestList<K> {
    fn from_parts(
        connection: Arc<Connection>,
        url: String,
        data: Option<Map<String, Value>>,
    ) -> Self {
        Self::new(connection, url, data)
    }
}

impl<K: ListKind> fmt::Debug for RestList<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.base, f)
    }
}
