//! The lazily loaded, write-buffering core shared by every resource.
//!
//! [`RestBase`] owns a resource's URL, its cached JSON snapshot and its
//! [`PendingChanges`]. The façades in [`object`](super::object),
//! [`dict`](super::dict) and [`list`](super::list) are thin views over it.
//!
//! # Lifecycle
//!
//! 1. Constructed with or without a snapshot. No I/O happens here.
//! 2. The first read without a snapshot issues one `GET` and caches the body
//!    (minus `http_etag`).
//! 3. Writes are validated against the kind's policy, then buffered.
//! 4. [`save`](RestBase::save) sends the buffer as one `PATCH` and drops the
//!    snapshot, so the next read sees the server's state.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::clients::{Connection, HttpMethod};
use crate::rest::{PendingChanges, ResourceError, ResourceKind};

/// Field the server adds to every body for conditional requests.
const ETAG_FIELD: &str = "http_etag";

/// Shared engine behind every REST resource.
pub struct RestBase<K: ResourceKind> {
    connection: Arc<Connection>,
    url: String,
    rest_data: Option<Map<String, Value>>,
    changes: PendingChanges,
    autosave: bool,
    _kind: PhantomData<fn() -> K>,
}

// Verify RestBase is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    enum Marker {}
    impl ResourceKind for Marker {
        type Fields = Map<String, Value>;
        const NAME: &'static str = "Marker";
    }
    assert_send_sync::<RestBase<Marker>>();
};

impl<K: ResourceKind> RestBase<K> {
    /// Creates the engine for the resource at `url`.
    #[must_use]
    pub fn new(
        connection: Arc<Connection>,
        url: impl Into<String>,
        data: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            connection,
            url: url.into(),
            rest_data: data.map(strip_etag),
            changes: PendingChanges::new(),
            autosave: K::AUTOSAVE,
            _kind: PhantomData,
        }
    }

    /// Returns the resource URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the shared connection.
    #[must_use]
    pub const fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    /// Returns `true` if a snapshot is cached.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.rest_data.is_some()
    }

    /// Returns the cached snapshot without fetching.
    #[must_use]
    pub const fn cached(&self) -> Option<&Map<String, Value>> {
        self.rest_data.as_ref()
    }

    /// Returns the writes not yet sent to the server.
    #[must_use]
    pub const fn pending_changes(&self) -> &PendingChanges {
        &self.changes
    }

    /// Returns whether writes are saved immediately.
    #[must_use]
    pub const fn autosave(&self) -> bool {
        self.autosave
    }

    /// Turns autosave on or off, returning the previous setting.
    pub fn set_autosave(&mut self, autosave: bool) -> bool {
        std::mem::replace(&mut self.autosave, autosave)
    }

    /// Returns the snapshot, fetching it first if none is cached.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or [`ResourceError::UnexpectedBody`] if the
    /// body is not a JSON object.
    pub async fn rest_data(&mut self) -> Result<&Map<String, Value>, ResourceError> {
        if self.rest_data.is_none() {
            tracing::debug!("Loading {} from {}", K::NAME, self.url);
            let response = self.connection.call(&self.url, None, None).await?;
            let data = match response.body {
                Some(Value::Object(map)) => strip_etag(map),
                _ => {
                    return Err(ResourceError::UnexpectedBody {
                        url: self.url.clone(),
                        expected: "a JSON object",
                    })
                }
            };
            self.rest_data = Some(data);
        }
        Ok(self.rest_data.get_or_insert_with(Map::new))
    }

    /// Reads one field.
    ///
    /// With a property list, unknown fields are rejected before any I/O and
    /// listed fields the server omitted read as `null`. Without one, a field
    /// absent from the data is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownField`], [`ResourceError::MissingField`]
    /// or the fetch error.
    pub async fn get(&mut self, key: &str) -> Result<Value, ResourceError> {
        if let Some(properties) = K::PROPERTIES {
            if !properties.contains(&key) {
                return Err(ResourceError::UnknownField {
                    resource: K::NAME,
                    field: key.to_string(),
                });
            }
            return Ok(self
                .rest_data()
                .await?
                .get(key)
                .cloned()
                .unwrap_or(Value::Null));
        }

        let url = self.url.clone();
        self.rest_data()
            .await?
            .get(key)
            .cloned()
            .ok_or_else(|| ResourceError::MissingField {
                resource: K::NAME,
                url,
                field: key.to_string(),
            })
    }

    /// Writes one field.
    ///
    /// The write is checked against the kind's policy before any I/O. Writing
    /// the value the snapshot already holds is a no-op (and discards a
    /// buffered write to that field). With autosave on, the change is saved
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ReadOnlyField`], the fetch error, or the save
    /// error.
    pub async fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), ResourceError> {
        K::check_writable(key)?;
        let value = value.into();

        if self.rest_data().await?.get(key) == Some(&value) {
            self.changes.remove(key);
            return Ok(());
        }

        self.stage(key, value).await
    }

    /// Buffers a write without checking the kind's policy.
    ///
    /// Used for write-only server fields such as `cleartext_password`.
    pub(crate) async fn stage(&mut self, key: &str, value: Value) -> Result<(), ResourceError> {
        self.changes.insert(key, value);
        if self.autosave {
            self.save().await?;
        }
        Ok(())
    }

    /// Sends buffered writes as one `PATCH` and drops the snapshot.
    ///
    /// With nothing buffered no request is made; the snapshot is still
    /// dropped. On failure the buffer is kept.
    ///
    /// # Errors
    ///
    /// Returns the `PATCH` error.
    pub async fn save(&mut self) -> Result<(), ResourceError> {
        if !self.changes.is_empty() {
            tracing::debug!(
                "Saving {} field(s) of {} at {}",
                self.changes.len(),
                K::NAME,
                self.url
            );
            let form = self.changes.to_form();
            self.connection
                .call(&self.url, Some(&form), Some(HttpMethod::Patch))
                .await?;
        }
        self.reset_cache();
        Ok(())
    }

    /// Deletes the resource on the server.
    ///
    /// # Errors
    ///
    /// Returns the `DELETE` error.
    pub async fn delete(&mut self) -> Result<(), ResourceError> {
        tracing::debug!("Deleting {} at {}", K::NAME, self.url);
        self.connection
            .call(&self.url, None, Some(HttpMethod::Delete))
            .await?;
        self.reset_cache();
        Ok(())
    }

    /// Drops the snapshot and the buffered writes.
    pub fn reset_cache(&mut self) {
        self.rest_data = None;
        self.changes.clear();
    }

    /// Decodes the snapshot into the kind's typed fields.
    ///
    /// # Errors
    ///
    /// Returns the fetch error or [`ResourceError::Deserialize`].
    pub async fn fields(&mut self) -> Result<K::Fields, ResourceError> {
        let data = self.rest_data().await?.clone();
        serde_json::from_value(Value::Object(data)).map_err(|source| ResourceError::Deserialize {
            resource: K::NAME,
            source,
        })
    }
}

impl<K: ResourceKind> Clone for RestBase<K> {
    fn clone(&self) -> Self {
        Self {
            connection: Arc::clone(&self.connection),
            url: self.url.clone(),
            rest_data: self.rest_data.clone(),
            changes: self.changes.clone(),
            autosave: self.autosave,
            _kind: PhantomData,
        }
    }
}

impl<K: ResourceKind> fmt::Debug for RestBase<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::NAME)
            .field("url", &self.url)
            .field("loaded", &self.rest_data.is_some())
            .field("pending_changes", &self.changes.len())
            .finish()
    }
}

fn strip_etag(mut data: Map<String, Value>) -> Map<String, Value> {
    data.remove(ETAG_FIELD);
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct ThingFields {
        name: String,
    }

    #[derive(Debug)]
    enum ThingKind {}

    impl ResourceKind for ThingKind {
        type Fields = ThingFields;
        const NAME: &'static str = "Thing";
        const PROPERTIES: Option<&'static [&'static str]> =
            Some(&["name", "colour", "self_link"]);
        const WRITABLE_PROPERTIES: Option<&'static [&'static str]> = Some(&["colour"]);
    }

    #[derive(Debug)]
    enum LooseKind {}

    impl ResourceKind for LooseKind {
        type Fields = Map<String, Value>;
        const NAME: &'static str = "Loose";
        const AUTOSAVE: bool = true;
    }

    fn connection(uri: &str) -> Arc<Connection> {
        let config = ClientConfig::builder().base_url(uri).build().unwrap();
        Arc::new(Connection::new(&config).unwrap())
    }

    fn snapshot(value: Value) -> Option<Map<String, Value>> {
        value.as_object().cloned()
    }

    #[tokio::test]
    async fn test_construction_does_no_io_and_strips_etag() {
        let base: RestBase<ThingKind> = RestBase::new(
            connection("http://127.0.0.1:9"),
            "http://127.0.0.1:9/3.0/things/1",
            snapshot(json!({"name": "one", "http_etag": "\"abc\""})),
        );
        assert!(base.is_loaded());
        assert!(base.cached().unwrap().get("http_etag").is_none());
    }

    #[tokio::test]
    async fn test_lazy_fetch_happens_once() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3.0/things/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "one",
                "http_etag": "\"abc\"",
                "self_link": "http://localhost:8001/3.0/things/1"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut base: RestBase<ThingKind> =
            RestBase::new(connection(&mock_server.uri()), "things/1", None);

        assert_eq!(base.get("name").await.unwrap(), json!("one"));
        assert_eq!(base.get("colour").await.unwrap(), Value::Null);
        assert_eq!(base.fields().await.unwrap().name, "one");
    }

    #[tokio::test]
    async fn test_unknown_field_is_rejected_without_io() {
        let mut base: RestBase<ThingKind> =
            RestBase::new(connection("http://127.0.0.1:9"), "things/1", None);

        let error = base.get("secret").await.unwrap_err();
        assert!(matches!(error, ResourceError::UnknownField { .. }));
        assert!(!base.is_loaded());
    }

    #[tokio::test]
    async fn test_missing_field_without_property_list() {
        let mut base: RestBase<LooseKind> = RestBase::new(
            connection("http://127.0.0.1:9"),
            "loose/1",
            snapshot(json!({"a": 1})),
        );
        assert_eq!(base.get("a").await.unwrap(), json!(1));
        assert!(matches!(
            base.get("b").await.unwrap_err(),
            ResourceError::MissingField { .. }
        ));
    }

    #[tokio::test]
    async fn test_read_only_write_is_rejected_before_io() {
        let mut base: RestBase<ThingKind> =
            RestBase::new(connection("http://127.0.0.1:9"), "things/1", None);

        let error = base.set("name", "two").await.unwrap_err();
        assert!(matches!(error, ResourceError::ReadOnlyField { .. }));
        let error = base.set("self_link", "x").await.unwrap_err();
        assert!(matches!(error, ResourceError::ReadOnlyField { .. }));
        assert!(base.pending_changes().is_empty());
    }

    #[tokio::test]
    async fn test_equal_write_is_a_no_op() {
        let mut base: RestBase<ThingKind> = RestBase::new(
            connection("http://127.0.0.1:9"),
            "things/1",
            snapshot(json!({"name": "one", "colour": "red"})),
        );

        base.set("colour", "blue").await.unwrap();
        assert_eq!(base.pending_changes().len(), 1);

        base.set("colour", "red").await.unwrap();
        assert!(base.pending_changes().is_empty());
    }

    #[tokio::test]
    async fn test_save_sends_one_patch_and_resets() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/3.0/things/1"))
            .and(body_string("colour=blue"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut base: RestBase<ThingKind> = RestBase::new(
            connection(&mock_server.uri()),
            "things/1",
            snapshot(json!({"name": "one", "colour": "red"})),
        );
        base.set("colour", "green").await.unwrap();
        base.set("colour", "blue").await.unwrap();
        base.save().await.unwrap();

        assert!(!base.is_loaded());
        assert!(base.pending_changes().is_empty());
    }

    #[tokio::test]
    async fn test_clearing_a_field_sends_an_empty_value() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/3.0/things/1"))
            .and(body_string("colour="))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut base: RestBase<ThingKind> = RestBase::new(
            connection(&mock_server.uri()),
            "things/1",
            snapshot(json!({"name": "one", "colour": "red"})),
        );
        base.set("colour", Value::Null).await.unwrap();
        assert_eq!(base.pending_changes().get("colour"), Some(&Value::Null));

        base.save().await.unwrap();
        assert!(base.pending_changes().is_empty());
    }

    #[tokio::test]
    async fn test_save_without_changes_makes_no_request() {
        let mut base: RestBase<ThingKind> = RestBase::new(
            connection("http://127.0.0.1:9"),
            "things/1",
            snapshot(json!({"name": "one"})),
        );
        base.save().await.unwrap();
        assert!(!base.is_loaded());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_pending_changes() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&mock_server)
            .await;

        let mut base: RestBase<ThingKind> = RestBase::new(
            connection(&mock_server.uri()),
            "things/1",
            snapshot(json!({"colour": "red"})),
        );
        base.set("colour", "blue").await.unwrap();
        assert!(base.save().await.is_err());
        assert_eq!(base.pending_changes().get("colour"), Some(&json!("blue")));
    }

    #[tokio::test]
    async fn test_autosave_patches_on_every_write() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/3.0/loose/1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(2)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3.0/loose/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"a": 1})))
            .mount(&mock_server)
            .await;

        let mut base: RestBase<LooseKind> = RestBase::new(
            connection(&mock_server.uri()),
            "loose/1",
            snapshot(json!({"a": 1})),
        );
        base.set("a", 2).await.unwrap();
        base.set("b", "x").await.unwrap();
        assert!(base.pending_changes().is_empty());
    }

    #[tokio::test]
    async fn test_non_object_body_is_unexpected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
            .mount(&mock_server)
            .await;

        let mut base: RestBase<LooseKind> =
            RestBase::new(connection(&mock_server.uri()), "loose/1", None);
        assert!(matches!(
            base.rest_data().await.unwrap_err(),
            ResourceError::UnexpectedBody { .. }
        ));
    }

    #[tokio::test]
    async fn test_delete_sends_delete() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/3.0/things/1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut base: RestBase<ThingKind> =
            RestBase::new(connection(&mock_server.uri()), "things/1", None);
        base.delete().await.unwrap();
    }

    #[tokio::test]
    async fn test_read_after_delete_refetches_and_is_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/3.0/things/1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3.0/things/1"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut base: RestBase<ThingKind> = RestBase::new(
            connection(&mock_server.uri()),
            "things/1",
            snapshot(json!({"name": "one", "colour": "red"})),
        );
        base.delete().await.unwrap();
        assert!(!base.is_loaded());

        let error = base.get("name").await.unwrap_err();
        assert!(matches!(error, ResourceError::NotFound(_)));
    }
}
