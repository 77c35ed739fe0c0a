//! Types and helpers shared by several resource kinds.

use std::fmt;
use std::sync::Arc;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::clients::{Connection, HttpResponse};
use crate::rest::{Resource, ResourceError};

/// The role of a membership on a mailing list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// A regular subscriber.
    #[default]
    Member,
    /// A list owner.
    Owner,
    /// A list moderator.
    Moderator,
    /// A known poster who is not subscribed.
    Nonmember,
}

impl MemberRole {
    /// Returns the role as the API spells it.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Owner => "owner",
            Self::Moderator => "moderator",
            Self::Nonmember => "nonmember",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A moderator's decision on a held message or subscription request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModerationDecision {
    /// Let the message through or grant the request.
    Accept,
    /// Refuse and notify the sender.
    Reject,
    /// Refuse silently.
    Discard,
    /// Postpone the decision.
    Defer,
}

impl ModerationDecision {
    /// Returns the action as the API spells it.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Discard => "discard",
            Self::Defer => "defer",
        }
    }
}

impl fmt::Display for ModerationDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the `entries` of a collection response; missing means empty.
pub(crate) fn entries(response: &HttpResponse) -> &[Value] {
    response
        .body_object()
        .and_then(|body| body.get("entries"))
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice)
}

/// Builds one `T` per collection entry.
pub(crate) fn materialize<T: Resource>(
    connection: &Arc<Connection>,
    entries: &[Value],
) -> Result<Vec<T>, ResourceError> {
    entries
        .iter()
        .map(|entry| T::from_entry(connection, entry))
        .collect()
}

/// Returns the `Location` header of a resource-creating response.
pub(crate) fn location(response: &HttpResponse, url: &str) -> Result<String, ResourceError> {
    response
        .location()
        .map(ToString::to_string)
        .ok_or_else(|| ResourceError::MissingLocation {
            url: url.to_string(),
        })
}

/// Takes the body of a response that must be a JSON object.
pub(crate) fn object_body(
    response: HttpResponse,
    url: &str,
) -> Result<Map<String, Value>, ResourceError> {
    match response.body {
        Some(Value::Object(map)) => Ok(map),
        _ => Err(ResourceError::UnexpectedBody {
            url: url.to_string(),
            expected: "a JSON object",
        }),
    }
}

/// Returns the `self_link` of a resource body.
pub(crate) fn self_link(data: &Map<String, Value>, url: &str) -> Result<String, ResourceError> {
    data.get("self_link")
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ResourceError::UnexpectedBody {
            url: url.to_string(),
            expected: "a resource with a self_link",
        })
}

/// Builds a resource from a body fetched at `url`.
pub(crate) fn from_body<T: Resource>(
    connection: &Arc<Connection>,
    response: HttpResponse,
    url: &str,
) -> Result<T, ResourceError> {
    let data = object_body(response, url)?;
    let link = self_link(&data, url)?;
    Ok(T::from_parts(Arc::clone(connection), link, Some(data)))
}

/// Renders an identifier that is a number in API 3.0 and a string in 3.1.
pub(crate) fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Deserializes an identifier that may be a number or a string.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_to_string(&value).ok_or_else(|| de::Error::custom(format!("invalid identifier: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_value(MemberRole::Nonmember).unwrap(), json!("nonmember"));
        let role: MemberRole = serde_json::from_value(json!("owner")).unwrap();
        assert_eq!(role, MemberRole::Owner);
        assert_eq!(MemberRole::Moderator.to_string(), "moderator");
    }

    #[test]
    fn test_decision_spelling() {
        assert_eq!(ModerationDecision::Discard.as_str(), "discard");
        assert_eq!(ModerationDecision::Defer.to_string(), "defer");
    }

    #[test]
    fn test_entries_default_to_empty() {
        let response = HttpResponse::new(200, HashMap::new(), Some(json!({"total_size": 0})));
        assert!(entries(&response).is_empty());

        let response = HttpResponse::new(200, HashMap::new(), None);
        assert!(entries(&response).is_empty());
    }

    #[test]
    fn test_location_is_required() {
        let response = HttpResponse::new(201, HashMap::new(), None);
        assert!(matches!(
            location(&response, "domains"),
            Err(ResourceError::MissingLocation { .. })
        ));
    }

    #[test]
    fn test_ids_accept_numbers_and_strings() {
        assert_eq!(id_to_string(&json!(42)), Some("42".to_string()));
        assert_eq!(
            id_to_string(&json!("00000000000000000000000000000001")),
            Some("00000000000000000000000000000001".to_string())
        );
        assert_eq!(id_to_string(&json!(null)), None);
    }
}
