//! Queue resource implementation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clients::FormData;
use crate::rest::resources::common::object_body;
use crate::rest::{ResourceError, ResourceKind, RestObject};

/// Data of a queue.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct QueueFields {
    pub name: String,
    pub directory: String,
    #[serde(default)]
    pub files: Vec<String>,
    pub self_link: String,
}

/// Marker for [`Queue`].
#[derive(Debug)]
pub enum QueueKind {}

impl ResourceKind for QueueKind {
    type Fields = QueueFields;
    const NAME: &'static str = "Queue";
    const PROPERTIES: Option<&'static [&'static str]> = Some(&["directory", "files", "name"]);
}

/// One of the server's processing queues (`queues/{name}`).
pub type Queue = RestObject<QueueKind>;

impl RestObject<QueueKind> {
    /// Returns the queue name.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn name(&mut self) -> Result<String, ResourceError> {
        self.require_str("name").await
    }

    /// Returns the queue's directory on the server.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn directory(&mut self) -> Result<String, ResourceError> {
        self.require_str("directory").await
    }

    /// Places a message for `list_id` in the queue.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn inject(&self, list_id: &str, text: &str) -> Result<(), ResourceError> {
        tracing::debug!("Injecting a message for {} into {}", list_id, self.url());
        let form = FormData::new()
            .field("list_id", list_id)
            .field("text", text);
        self.connection().call(self.url(), Some(&form), None).await?;
        Ok(())
    }

    /// Lists the files currently in the queue.
    ///
    /// Always fetched; the snapshot is neither read nor updated.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or [`ResourceError::UnexpectedBody`] if the
    /// body has no `files` array.
    pub async fn files(&self) -> Result<Vec<String>, ResourceError> {
        let response = self.connection().call(self.url(), None, None).await?;
        let body = object_body(response, self.url())?;
        let unexpected = || ResourceError::UnexpectedBody {
            url: self.url().to_string(),
            expected: "an object with a files array",
        };
        body.get("files")
            .and_then(Value::as_array)
            .ok_or_else(unexpected)?
            .iter()
            .map(|file| file.as_str().map(ToString::to_string).ok_or_else(unexpected))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::Connection;
    use crate::config::ClientConfig;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn queue(uri: &str) -> Queue {
        let config = ClientConfig::builder().base_url(uri).build().unwrap();
        Queue::new(
            Arc::new(Connection::new(&config).unwrap()),
            "queues/in",
            json!({"name": "in", "directory": "/var/lib/mailman/queue/in", "files": []})
                .as_object()
                .cloned(),
        )
    }

    #[tokio::test]
    async fn test_files_are_always_refetched() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3.0/queues/in"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "in",
                "directory": "/var/lib/mailman/queue/in",
                "files": ["1425.pck"],
                "self_link": "http://localhost:8001/3.0/queues/in"
            })))
            .expect(2)
            .mount(&mock_server)
            .await;

        let queue = queue(&mock_server.uri());
        assert_eq!(queue.files().await.unwrap(), vec!["1425.pck"]);
        assert_eq!(queue.files().await.unwrap(), vec!["1425.pck"]);
    }

    #[tokio::test]
    async fn test_inject_posts_list_id_and_text() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/3.0/queues/in"))
            .and(body_string("list_id=ant.example.com&text=Subject%3A%20hi"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let queue = queue(&mock_server.uri());
        queue.inject("ant.example.com", "Subject: hi").await.unwrap();
        assert_eq!(queue.clone().name().await.unwrap(), "in");
    }
}
