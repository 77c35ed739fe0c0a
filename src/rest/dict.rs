//! Resources exposed as key/value mappings.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::clients::Connection;
use crate::rest::{PendingChanges, Resource, ResourceError, ResourceKind, RestBase};

/// A REST resource that behaves like a dictionary of settings.
///
/// Keys outside the kind's property list are hidden from every view
/// ([`keys`](Self::keys), [`len`](Self::len), [`to_map`](Self::to_map)).
/// Keys cannot be removed.
///
/// # Example
///
/// ```rust,ignore
/// let mut settings = list.settings().await?;
/// settings
///     .update([("description", json!("Ants only")), ("advertised", json!(false))])
///     .await?;
/// settings.save().await?;
/// ```
pub struct RestDict<K: ResourceKind> {
    base: RestBase<K>,
}

impl<K: ResourceKind> RestDict<K> {
    /// Creates a mapping for `url`, optionally with a cached snapshot.
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

    /// Returns the resource URL.
    #[must_use]
    pub fn url(&self) -> &str {
        self.base.url()
    }

    /// Returns `true` if a snapshot is cached.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.base.is_loaded()
    }

    /// Returns the writes not yet sent to the server.
    #[must_use]
    pub const fn pending_changes(&self) -> &PendingChanges {
        self.base.pending_changes()
    }

    pub(crate) const fn connection(&self) -> &Arc<Connection> {
        self.base.connection()
    }

    /// Returns the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownField`] or
    /// [`ResourceError::MissingField`], or the fetch error.
    pub async fn get(&mut self, key: &str) -> Result<Value, ResourceError> {
        self.base.get(key).await
    }

    /// Returns the value for `key`, or `default` when the key is hidden or
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn get_or(&mut self, key: &str, default: Value) -> Result<Value, ResourceError> {
        if !K::is_visible(key) {
            return Ok(default);
        }
        Ok(self
            .base
            .rest_data()
            .await?
            .get(key)
            .cloned()
            .unwrap_or(default))
    }

    /// Writes one key.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ReadOnlyField`], the fetch error or the save
    /// error.
    pub async fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), ResourceError> {
        self.base.set(key, value).await
    }

    /// Returns `true` if `key` is visible and present.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn contains_key(&mut self, key: &str) -> Result<bool, ResourceError> {
        Ok(K::is_visible(key) && self.base.rest_data().await?.contains_key(key))
    }

    /// Returns the visible keys.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn keys(&mut self) -> Result<Vec<String>, ResourceError> {
        Ok(self
            .base
            .rest_data()
            .await?
            .keys()
            .filter(|key| K::is_visible(key))
            .cloned()
            .collect())
    }

    /// Returns the number of visible keys.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn len(&mut self) -> Result<usize, ResourceError> {
        Ok(self
            .base
            .rest_data()
            .await?
            .keys()
            .filter(|key| K::is_visible(key))
            .count())
    }

    /// Returns `true` if no key is visible.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn is_empty(&mut self) -> Result<bool, ResourceError> {
        Ok(self.len().await? == 0)
    }

    /// Returns the visible entries as an owned map.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn to_map(&mut self) -> Result<Map<String, Value>, ResourceError> {
        Ok(self
            .base
            .rest_data()
            .await?
            .iter()
            .filter(|(key, _)| K::is_visible(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    /// Writes several keys with at most one `PATCH`.
    ///
    /// Autosave is suspended while the writes are buffered. If it was on, the
    /// buffer is saved once afterwards; otherwise the writes stay pending.
    ///
    /// # Errors
    ///
    /// Returns the first write error (nothing is saved in that case) or the
    /// save error.
    pub async fn update<I, S, V>(&mut self, entries: I) -> Result<(), ResourceError>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<Value>,
    {
        let autosave = self.base.set_autosave(false);
        let mut result = Ok(());
        for (key, value) in entries {
            result = self.base.set(key.as_ref(), value).await;
            if result.is_err() {
                break;
            }
        }
        self.base.set_autosave(autosave);
        result?;

        if autosave {
            self.base.save().await?;
        }
        Ok(())
    }

    /// Always fails: keys of a REST mapping cannot be deleted.
    ///
    /// # Errors
    ///
    /// Always returns [`ResourceError::KeyDeletionUnsupported`].
    pub fn remove(&mut self, _key: &str) -> Result<Value, ResourceError> {
        Err(ResourceError::KeyDeletionUnsupported { resource: K::NAME })
    }

    /// Sends buffered writes.
    ///
    /// # Errors
    ///
    /// Returns the `PATCH` error.
    pub async fn save(&mut self) -> Result<(), ResourceError> {
        self.base.save().await
    }

    /// Drops the snapshot and any buffered writes.
    pub fn reset_cache(&mut self) {
        self.base.reset_cache();
    }

    /// Decodes the snapshot into the kind's typed fields.
    ///
    /// # Errors
    ///
    /// Returns the fetch error or [`ResourceError::Deserialize`].
    pub async fn fields(&mut self) -> Result<K::Fields, ResourceError> {
        self.base.fields().await
    }
}

impl<K: ResourceKind> Resource for RestDict<K> {
    fn from_parts(
        connection: Arc<Connection>,
        url: String,
        data: Option<Map<String, Value>>,
    ) -> Self {
        Self::new(connection, url, data)
    }
}

impl<K: ResourceKind> fmt::Debug for RestDict<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.base, f)
    }
}
