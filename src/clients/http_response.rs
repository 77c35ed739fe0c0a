//! HTTP response types.
//!
//! [`HttpResponse`] is the "response metadata + decoded body" pair returned
//! by [`Connection::call`](crate::clients::Connection::call).

use std::collections::HashMap;

use serde_json::Value;

/// A successful (2xx) response from the REST API.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers (lower-cased names, possibly multi-valued).
    pub headers: HashMap<String, Vec<String>>,
    /// The decoded JSON body; `None` when the body was empty.
    pub body: Option<Value>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`.
    #[must_use]
    pub const fn new(code: u16, headers: HashMap<String, Vec<String>>, body: Option<Value>) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns `true` for `202 Accepted`, which Mailman uses for requests
    /// that are held for confirmation or moderator approval.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.code == 202
    }

    /// Returns the first value of a header, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `Location` header set by resource-creating calls.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    /// Returns the body as a JSON object, if it is one.
    #[must_use]
    pub fn body_object(&self) -> Option<&serde_json::Map<String, Value>> {
        self.body.as_ref().and_then(Value::as_object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, Vec<String>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in pairs {
            map.entry((*name).to_string())
                .or_default()
                .push((*value).to_string());
        }
        map
    }

    #[test]
    fn test_is_ok_covers_2xx_range() {
        assert!(HttpResponse::new(200, HashMap::new(), None).is_ok());
        assert!(HttpResponse::new(204, HashMap::new(), None).is_ok());
        assert!(!HttpResponse::new(301, HashMap::new(), None).is_ok());
    }

    #[test]
    fn test_is_accepted_only_for_202() {
        assert!(HttpResponse::new(202, HashMap::new(), None).is_accepted());
        assert!(!HttpResponse::new(201, HashMap::new(), None).is_accepted());
    }

    #[test]
    fn test_location_header_lookup() {
        let response = HttpResponse::new(
            201,
            headers(&[("location", "http://localhost:8001/3.0/members/1")]),
            None,
        );
        assert_eq!(
            response.location(),
            Some("http://localhost:8001/3.0/members/1")
        );
        assert_eq!(
            response.header("Location"),
            Some("http://localhost:8001/3.0/members/1")
        );
    }

    #[test]
    fn test_body_object() {
        let response = HttpResponse::new(200, HashMap::new(), Some(json!({"a": 1})));
        assert_eq!(response.body_object().unwrap().get("a"), Some(&json!(1)));

        let response = HttpResponse::new(200, HashMap::new(), Some(json!([1, 2])));
        assert!(response.body_object().is_none());
    }
}
