//! Header-match rule resource implementation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clients::FormData;
use crate::rest::resources::common::location;
use crate::rest::{ListKind, ResourceError, ResourceKind, RestList, RestObject};

/// Data of a header-match rule.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct HeaderMatchFields {
    pub header: String,
    pub pattern: String,
    #[serde(default)]
    pub position: Option<u32>,
    /// One of `accept`, `discard`, `reject`, `hold`, or `None` for the
    /// site default chain.
    #[serde(default)]
    pub action: Option<String>,
    pub self_link: String,
}

/// Marker for [`HeaderMatch`].
#[derive(Debug)]
pub enum HeaderMatchKind {}

impl ResourceKind for HeaderMatchKind {
    type Fields = HeaderMatchFields;
    const NAME: &'static str = "HeaderMatch";
    const PROPERTIES: Option<&'static [&'static str]> =
        Some(&["header", "pattern", "position", "action", "self_link"]);
    const WRITABLE_PROPERTIES: Option<&'static [&'static str]> =
        Some(&["header", "pattern", "position", "action"]);
}

/// A rule matching a message header against a regular expression.
pub type HeaderMatch = RestObject<HeaderMatchKind>;

/// Marker for [`HeaderMatches`].
#[derive(Debug)]
pub enum HeaderMatchesKind {}

impl ResourceKind for HeaderMatchesKind {
    type Fields = Map<String, Value>;
    const NAME: &'static str = "HeaderMatches";
}

impl ListKind for HeaderMatchesKind {
    type Item = HeaderMatch;
}

/// The header-match rules of a list, in evaluation order.
pub type HeaderMatches = RestList<HeaderMatchesKind>;

impl RestList<HeaderMatchesKind> {
    /// Adds a rule. Without `action` the site default chain applies.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn add(
        &mut self,
        header: &str,
        pattern: &str,
        action: Option<&str>,
    ) -> Result<HeaderMatch, ResourceError> {
        let form = FormData::new()
            .field("header", header)
            .field("pattern", pattern)
            .optional_field("action", action);
        let response = self
            .connection()
            .call(self.url(), Some(&form), None)
            .await?;
        self.reset_cache();
        let url = location(&response, self.url())?;
        Ok(HeaderMatch::new(Arc::clone(self.connection()), url, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_match_policy() {
        assert!(HeaderMatchKind::check_writable("pattern").is_ok());
        assert!(HeaderMatchKind::check_writable("position").is_ok());
        assert!(HeaderMatchKind::check_writable("self_link").is_err());
        assert!(HeaderMatchKind::check_writable("list_id").is_err());
    }
}
