//! Single-entity resources with named fields.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::clients::Connection;
use crate::rest::{PendingChanges, Resource, ResourceError, ResourceKind, RestBase};

/// A REST resource addressed by URL whose fields are read and written by
/// name.
///
/// Every Mailman entity (domain, list, member, user, ...) is a
/// `RestObject` parameterized by its kind; kind-specific operations are
/// inherent methods on the alias (e.g. [`Domain`](crate::resources::Domain)).
///
/// # Example
///
/// ```rust,ignore
/// let mut list = client.get_list("ant@example.com").await?;
///
/// list.set("display_name", "Ant Colony").await?;
/// list.save().await?;
///
/// let fields = list.fields().await?;
/// println!("{} has {} members", fields.fqdn_listname, fields.member_count);
/// ```
pub struct RestObject<K: ResourceKind> {
    base: RestBase<K>,
}

impl<K: ResourceKind> RestObject<K> {
    /// Creates a resource for `url`, optionally with a cached snapshot.
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

    /// Returns the shared connection.
    #[must_use]
    pub const fn connection(&self) -> &Arc<Connection> {
        self.base.connection()
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

    /// Returns the snapshot, fetching it if needed.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn rest_data(&mut self) -> Result<&Map<String, Value>, ResourceError> {
        self.base.rest_data().await
    }

    /// Reads one field. See [`RestBase::get`].
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownField`] for fields outside the kind's
    /// property list, or the fetch error.
    pub async fn get(&mut self, key: &str) -> Result<Value, ResourceError> {
        self.base.get(key).await
    }

    /// Writes one field. See [`RestBase::set`].
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ReadOnlyField`], the fetch error or the save
    /// error.
    pub async fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), ResourceError> {
        self.base.set(key, value).await
    }

    /// Sends buffered writes. See [`RestBase::save`].
    ///
    /// # Errors
    ///
    /// Returns the `PATCH` error.
    pub async fn save(&mut self) -> Result<(), ResourceError> {
        self.base.save().await
    }

    /// Deletes the resource on the server.
    ///
    /// # Errors
    ///
    /// Returns the `DELETE` error.
    pub async fn delete(&mut self) -> Result<(), ResourceError> {
        self.base.delete().await
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

    /// Returns the server's canonical URL for this resource.
    ///
    /// Falls back to [`url`](Self::url) if the server did not send one.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn self_link(&mut self) -> Result<String, ResourceError> {
        let url = self.url().to_string();
        Ok(self
            .rest_data()
            .await?
            .get("self_link")
            .and_then(Value::as_str)
            .map_or(url, ToString::to_string))
    }

    pub(crate) async fn stage(&mut self, key: &str, value: Value) -> Result<(), ResourceError> {
        self.base.stage(key, value).await
    }

    /// Reads a string field, `None` when absent or `null`.
    pub(crate) async fn get_str(&mut self, key: &str) -> Result<Option<String>, ResourceError> {
        Ok(self
            .rest_data()
            .await?
            .get(key)
            .and_then(Value::as_str)
            .map(ToString::to_string))
    }

    /// Reads a string field that must be present.
    pub(crate) async fn require_str(&mut self, key: &str) -> Result<String, ResourceError> {
        let url = self.url().to_string();
        self.get_str(key)
            .await?
            .ok_or_else(|| ResourceError::MissingField {
                resource: K::NAME,
                url,
                field: key.to_string(),
            })
    }
}

impl<K: ResourceKind> Resource for RestObject<K> {
    fn from_parts(
        connection: Arc<Connection>,
        url: String,
        data: Option<Map<String, Value>>,
    ) -> Self {
        Self::new(connection, url, data)
    }
}

impl<K: ResourceKind> Clone for RestObject<K> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
        }
    }
}

impl<K: ResourceKind> fmt::Debug for RestObject<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.base, f)
    }
}

impl<K: ResourceKind> fmt::Display for RestObject<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} at {}>", K::NAME, self.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use serde_json::json;

    #[derive(Debug)]
    enum NoteKind {}

    impl ResourceKind for NoteKind {
        type Fields = Map<String, Value>;
        const NAME: &'static str = "Note";
    }

    fn offline_connection() -> Arc<Connection> {
        let config = ClientConfig::builder()
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        Arc::new(Connection::new(&config).unwrap())
    }

    #[tokio::test]
    async fn test_self_link_prefers_server_value() {
        let mut note: RestObject<NoteKind> = RestObject::new(
            offline_connection(),
            "notes/1",
            json!({"self_link": "http://127.0.0.1:9/3.0/notes/1"})
                .as_object()
                .cloned(),
        );
        assert_eq!(
            note.self_link().await.unwrap(),
            "http://127.0.0.1:9/3.0/notes/1"
        );
    }

    #[tokio::test]
    async fn test_require_str_reports_missing_field() {
        let mut note: RestObject<NoteKind> = RestObject::new(
            offline_connection(),
            "notes/1",
            json!({"title": null}).as_object().cloned(),
        );
        assert_eq!(note.get_str("title").await.unwrap(), None);
        assert!(matches!(
            note.require_str("title").await.unwrap_err(),
            ResourceError::MissingField { .. }
        ));
    }

    #[test]
    fn test_display_names_kind_and_url() {
        let note: RestObject<NoteKind> = RestObject::new(offline_connection(), "notes/1", None);
        assert_eq!(note.to_string(), "<Note at notes/1>");
    }
}
