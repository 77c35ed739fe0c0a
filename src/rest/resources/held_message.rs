//! Held message resource implementation.

use serde::{Deserialize, Serialize};

use crate::clients::{FormData, HttpMethod, HttpResponse};
use crate::rest::resources::common::{deserialize_id, ModerationDecision};
use crate::rest::{ResourceError, ResourceKind, RestObject};

/// Data of a message waiting for moderation.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct HeldMessageFields {
    #[serde(deserialize_with = "deserialize_id")]
    pub request_id: String,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub hold_date: Option<String>,
    /// The raw message text.
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default, rename = "type")]
    pub request_type: Option<String>,
    pub self_link: String,
}

/// Marker for [`HeldMessage`].
#[derive(Debug)]
pub enum HeldMessageKind {}

impl ResourceKind for HeldMessageKind {
    type Fields = HeldMessageFields;
    const NAME: &'static str = "HeldMessage";
    const PROPERTIES: Option<&'static [&'static str]> = Some(&[
        "hold_date",
        "message_id",
        "msg",
        "reason",
        "request_id",
        "self_link",
        "sender",
        "subject",
        "type",
    ]);
}

/// A message held for moderation (`lists/{list_id}/held/{request_id}`).
pub type HeldMessage = RestObject<HeldMessageKind>;

impl RestObject<HeldMessageKind> {
    /// Returns the sender of the message.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn sender(&mut self) -> Result<Option<String>, ResourceError> {
        self.get_str("sender").await
    }

    /// Returns the subject of the message.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn subject(&mut self) -> Result<Option<String>, ResourceError> {
        self.get_str("subject").await
    }

    /// Applies `action` to the message.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn moderate(
        &self,
        action: ModerationDecision,
    ) -> Result<HttpResponse, ResourceError> {
        tracing::debug!("Moderating {}: {}", self.url(), action);
        let form = FormData::new().field("action", action.as_str());
        Ok(self
            .connection()
            .call(self.url(), Some(&form), Some(HttpMethod::Post))
            .await?)
    }

    /// Lets the message through.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn accept(&self) -> Result<HttpResponse, ResourceError> {
        self.moderate(ModerationDecision::Accept).await
    }

    /// Refuses the message and notifies the sender.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn reject(&self) -> Result<HttpResponse, ResourceError> {
        self.moderate(ModerationDecision::Reject).await
    }

    /// Drops the message silently.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn discard(&self) -> Result<HttpResponse, ResourceError> {
        self.moderate(ModerationDecision::Discard).await
    }

    /// Postpones the decision.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn defer(&self) -> Result<HttpResponse, ResourceError> {
        self.moderate(ModerationDecision::Defer).await
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

    #[test]
    fn test_type_field_is_renamed() {
        let fields: HeldMessageFields = serde_json::from_value(json!({
            "request_id": 7,
            "type": "held message",
            "sender": "bart@example.com",
            "self_link": "http://localhost:8001/3.0/lists/ant.example.com/held/7"
        }))
        .unwrap();
        assert_eq!(fields.request_id, "7");
        assert_eq!(fields.request_type.as_deref(), Some("held message"));
    }

    #[tokio::test]
    async fn test_discard_posts_action_to_message_url() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/3.0/lists/ant.example.com/held/7"))
            .and(body_string("action=discard"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = ClientConfig::builder()
            .base_url(mock_server.uri())
            .build()
            .unwrap();
        let message = HeldMessage::new(
            Arc::new(Connection::new(&config).unwrap()),
            "lists/ant.example.com/held/7",
            None,
        );
        let response = message.discard().await.unwrap();
        assert_eq!(response.code, 204);
    }

    #[tokio::test]
    async fn test_moderate_accept_posts_decision() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/3.0/lists/ant.example.com/held/8"))
            .and(body_string("action=accept"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = ClientConfig::builder()
            .base_url(mock_server.uri())
            .build()
            .unwrap();
        let message = HeldMessage::new(
            Arc::new(Connection::new(&config).unwrap()),
            "lists/ant.example.com/held/8",
            None,
        );
        let response = message.moderate(ModerationDecision::Accept).await.unwrap();
        assert_eq!(response.code, 204);
    }
}
