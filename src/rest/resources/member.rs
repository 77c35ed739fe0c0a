//! Membership resource implementation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clients::HttpMethod;
use crate::rest::resources::common::MemberRole;
use crate::rest::resources::{Address, Preferences, User};
use crate::rest::{ResourceError, ResourceKind, RestObject};

/// Data of a membership.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct MemberFields {
    /// URL of the subscribed address.
    pub address: String,
    pub email: String,
    pub list_id: String,
    #[serde(default)]
    pub role: MemberRole,
    #[serde(default)]
    pub delivery_mode: Option<String>,
    #[serde(default)]
    pub moderation_action: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// URL of the owning user.
    #[serde(default)]
    pub user: Option<String>,
    pub self_link: String,
}

/// Marker for [`Member`].
#[derive(Debug)]
pub enum MemberKind {}

impl ResourceKind for MemberKind {
    type Fields = MemberFields;
    const NAME: &'static str = "Member";
    const PROPERTIES: Option<&'static [&'static str]> = Some(&[
        "delivery_mode",
        "email",
        "list_id",
        "moderation_action",
        "role",
        "self_link",
    ]);
    const WRITABLE_PROPERTIES: Option<&'static [&'static str]> =
        Some(&["address", "delivery_mode", "moderation_action"]);
}

/// A subscription of an address to a list, in some role.
pub type Member = RestObject<MemberKind>;

impl RestObject<MemberKind> {
    /// Returns the subscribed email address.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn email(&mut self) -> Result<String, ResourceError> {
        self.require_str("email").await
    }

    /// Returns the id of the list.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn list_id(&mut self) -> Result<String, ResourceError> {
        self.require_str("list_id").await
    }

    /// Returns the membership role.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or [`ResourceError::Deserialize`] for an
    /// unknown role.
    pub async fn role(&mut self) -> Result<MemberRole, ResourceError> {
        let role = self.get("role").await?;
        serde_json::from_value(role).map_err(|source| ResourceError::Deserialize {
            resource: "MemberRole",
            source,
        })
    }

    /// Returns the subscribed address (fetched lazily).
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn address(&mut self) -> Result<Address, ResourceError> {
        let url = self.require_str("address").await?;
        Ok(Address::new(Arc::clone(self.connection()), url, None))
    }

    /// Returns the user owning the subscribed address (fetched lazily).
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn user(&mut self) -> Result<User, ResourceError> {
        let url = self.require_str("user").await?;
        Ok(User::new(Arc::clone(self.connection()), url, None))
    }

    /// Ends the membership.
    ///
    /// # Errors
    ///
    /// Returns the `DELETE` error.
    pub async fn unsubscribe(&mut self) -> Result<(), ResourceError> {
        let url = self.self_link().await?;
        tracing::debug!("Unsubscribing {}", url);
        self.connection()
            .call(&url, None, Some(HttpMethod::Delete))
            .await?;
        self.reset_cache();
        Ok(())
    }

    /// Returns the membership's delivery preferences.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn preferences(&mut self) -> Result<Preferences, ResourceError> {
        let url = format!("{}/preferences", self.self_link().await?);
        Ok(Preferences::new(Arc::clone(self.connection()), url, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_member_policy() {
        assert!(MemberKind::check_writable("delivery_mode").is_ok());
        assert!(MemberKind::check_writable("address").is_ok());
        assert!(MemberKind::check_writable("email").is_err());
        assert!(MemberKind::check_writable("role").is_err());
        assert!(!MemberKind::is_visible("address"));
    }

    #[test]
    fn test_member_fields_deserialize() {
        let fields: MemberFields = serde_json::from_value(json!({
            "address": "http://localhost:8001/3.0/addresses/anne@example.com",
            "email": "anne@example.com",
            "list_id": "ant.example.com",
            "role": "moderator",
            "delivery_mode": "regular",
            "user": "http://localhost:8001/3.0/users/1",
            "self_link": "http://localhost:8001/3.0/members/1",
            "member_id": 1
        }))
        .unwrap();
        assert_eq!(fields.role, MemberRole::Moderator);
        assert_eq!(fields.moderation_action, None);
    }
}
