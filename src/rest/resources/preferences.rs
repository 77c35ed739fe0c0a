//! Delivery preferences resource implementation.
//!
//! Preferences exist site-wide (`system/preferences`) and under every
//! member, user and address (`{self_link}/preferences`).

use serde::{Deserialize, Serialize};

use crate::clients::HttpMethod;
use crate::rest::{ResourceError, ResourceKind, RestDict};

/// Data of a preferences record. Unset preferences are inherited.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PreferencesFields {
    #[serde(default)]
    pub acknowledge_posts: Option<bool>,
    #[serde(default)]
    pub delivery_mode: Option<String>,
    #[serde(default)]
    pub delivery_status: Option<String>,
    #[serde(default)]
    pub hide_address: Option<bool>,
    #[serde(default)]
    pub preferred_language: Option<String>,
    #[serde(default)]
    pub receive_list_copy: Option<bool>,
    #[serde(default)]
    pub receive_own_postings: Option<bool>,
}

/// Marker for [`Preferences`].
#[derive(Debug)]
pub enum PreferencesKind {}

impl ResourceKind for PreferencesKind {
    type Fields = PreferencesFields;
    const NAME: &'static str = "Preferences";
    const PROPERTIES: Option<&'static [&'static str]> = Some(&[
        "acknowledge_posts",
        "delivery_mode",
        "delivery_status",
        "hide_address",
        "preferred_language",
        "receive_list_copy",
        "receive_own_postings",
    ]);
}

/// A preferences record.
pub type Preferences = RestDict<PreferencesKind>;

impl RestDict<PreferencesKind> {
    /// Resets every preference to its inherited value.
    ///
    /// # Errors
    ///
    /// Returns the `DELETE` error.
    pub async fn delete(&mut self) -> Result<(), ResourceError> {
        tracing::debug!("Resetting preferences at {}", self.url());
        self.connection()
            .call(self.url(), None, Some(HttpMethod::Delete))
            .await?;
        self.reset_cache();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_allowlist() {
        assert!(PreferencesKind::is_visible("delivery_mode"));
        assert!(!PreferencesKind::is_visible("self_link"));
    }

    #[test]
    fn test_unset_preferences_are_none() {
        let fields: PreferencesFields =
            serde_json::from_value(serde_json::json!({"delivery_mode": "regular"})).unwrap();
        assert_eq!(fields.delivery_mode.as_deref(), Some("regular"));
        assert_eq!(fields.hide_address, None);
    }
}
