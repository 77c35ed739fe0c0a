//! User resource implementation.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::clients::FormData;
use crate::rest::resources::common::{deserialize_id, entries, id_to_string, location, materialize};
use crate::rest::resources::{Address, Addresses, Member, Preferences};
use crate::rest::{build_path, ResourceError, ResourceKind, RestObject};

/// Data of a user.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UserFields {
    /// A number in API 3.0, a hex string in API 3.1.
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub created_on: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_server_owner: bool,
    /// The password hash, if any.
    #[serde(default)]
    pub password: Option<String>,
    pub self_link: String,
}

/// Marker for [`User`].
#[derive(Debug)]
pub enum UserKind {}

impl ResourceKind for UserKind {
    type Fields = UserFields;
    const NAME: &'static str = "User";
    const PROPERTIES: Option<&'static [&'static str]> = Some(&[
        "created_on",
        "display_name",
        "is_server_owner",
        "password",
        "self_link",
        "user_id",
    ]);
    const WRITABLE_PROPERTIES: Option<&'static [&'static str]> =
        Some(&["cleartext_password", "display_name", "is_server_owner"]);
}

/// A person, owning one or more addresses.
pub type User = RestObject<UserKind>;

impl RestObject<UserKind> {
    /// Returns the user id, rendered as a string.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or [`ResourceError::MissingField`] if the
    /// server sent no id.
    pub async fn user_id(&mut self) -> Result<String, ResourceError> {
        let url = self.url().to_string();
        self.get("user_id")
            .await
            .map(|value| id_to_string(&value))?
            .ok_or_else(|| ResourceError::MissingField {
                resource: "User",
                url,
                field: "user_id".to_string(),
            })
    }

    /// Returns the display name.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn display_name(&mut self) -> Result<Option<String>, ResourceError> {
        self.get_str("display_name").await
    }

    /// Buffers a new password.
    ///
    /// The server stores only a hash, so the value is sent as
    /// `cleartext_password` on the next save.
    ///
    /// # Errors
    ///
    /// Returns the save error when autosave is on.
    pub async fn set_password(&mut self, password: &str) -> Result<(), ResourceError> {
        self.stage("cleartext_password", json!(password)).await
    }

    /// Returns the user's addresses.
    ///
    /// # Errors
    ///
    /// Returns the fetch error for the user id.
    pub async fn addresses(&mut self) -> Result<Addresses, ResourceError> {
        let path = build_path(
            "users/{user_id}/addresses",
            &[("user_id", self.user_id().await?)],
        );
        Ok(Addresses::new(Arc::clone(self.connection()), path, None))
    }

    /// Returns every membership of every address of the user.
    ///
    /// Recomputed on every call.
    ///
    /// # Errors
    ///
    /// Returns the first fetch or search error.
    pub async fn subscriptions(&mut self) -> Result<Vec<Member>, ResourceError> {
        let mut subscriptions = Vec::new();
        for mut address in self.addresses().await?.items().await? {
            let form = FormData::new().field("subscriber", address.email().await?);
            let response = self
                .connection()
                .call("members/find", Some(&form), None)
                .await?;
            subscriptions.extend(materialize::<Member>(self.connection(), entries(&response))?);
        }
        Ok(subscriptions)
    }

    /// Returns the ids of the lists the user is subscribed to.
    ///
    /// # Errors
    ///
    /// Returns the first fetch or search error.
    pub async fn subscription_list_ids(&mut self) -> Result<Vec<String>, ResourceError> {
        let mut list_ids = Vec::new();
        for mut member in self.subscriptions().await? {
            list_ids.push(member.list_id().await?);
        }
        Ok(list_ids)
    }

    /// Adds `email` to the user.
    ///
    /// With `absorb_existing`, an address that already belongs to another
    /// user is taken over and that user is merged into this one.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Conflict`] if the address exists and
    /// `absorb_existing` is off, or another `POST` error.
    pub async fn add_address(
        &mut self,
        email: &str,
        absorb_existing: bool,
    ) -> Result<Address, ResourceError> {
        let url = format!("{}/addresses", self.url());
        let mut form = FormData::new().field("email", email);
        if absorb_existing {
            form = form.field("absorb_existing", 1);
        }
        let response = self.connection().call(&url, Some(&form), None).await?;
        let self_link = location(&response, &url)?;

        let mut data = Map::new();
        data.insert("email".to_string(), Value::from(email));
        data.insert("self_link".to_string(), Value::from(self_link.as_str()));
        Ok(Address::new(
            Arc::clone(self.connection()),
            self_link,
            Some(data),
        ))
    }

    /// Returns the user's delivery preferences.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn preferences(&mut self) -> Result<Preferences, ResourceError> {
        let url = format!("{}/preferences", self.self_link().await?);
        Ok(Preferences::new(Arc::clone(self.connection()), url, None))
    }
}
