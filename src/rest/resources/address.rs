//! Email address resource implementation.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clients::HttpMethod;
use crate::rest::resources::{Preferences, User};
use crate::rest::{build_path, ListKind, ResourceError, ResourceKind, RestList, RestObject};

/// Data of an address.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AddressFields {
    pub email: String,
    #[serde(default)]
    pub original_email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub registered_on: Option<NaiveDateTime>,
    /// `None` until the address is verified.
    #[serde(default)]
    pub verified_on: Option<NaiveDateTime>,
    /// URL of the owning user, if any.
    #[serde(default)]
    pub user: Option<String>,
    pub self_link: String,
}

/// Marker for [`Address`].
#[derive(Debug)]
pub enum AddressKind {}

impl ResourceKind for AddressKind {
    type Fields = AddressFields;
    const NAME: &'static str = "Address";
    const PROPERTIES: Option<&'static [&'static str]> = Some(&[
        "display_name",
        "email",
        "original_email",
        "registered_on",
        "self_link",
        "verified_on",
    ]);
}

/// An email address known to Mailman.
pub type Address = RestObject<AddressKind>;

impl RestObject<AddressKind> {
    /// Returns the (lowercased) email address.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn email(&mut self) -> Result<String, ResourceError> {
        self.require_str("email").await
    }

    /// Returns the display name.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn display_name(&mut self) -> Result<Option<String>, ResourceError> {
        self.get_str("display_name").await
    }

    /// Returns the user owning this address, if it is linked to one.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn user(&mut self) -> Result<Option<User>, ResourceError> {
        let connection = Arc::clone(self.connection());
        Ok(self
            .get_str("user")
            .await?
            .map(|url| User::new(connection, url, None)))
    }

    /// Returns `true` once the address has been verified.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn verified(&mut self) -> Result<bool, ResourceError> {
        Ok(!self.get("verified_on").await?.is_null())
    }

    /// Marks the address as verified.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn verify(&mut self) -> Result<(), ResourceError> {
        self.verification("verify").await
    }

    /// Marks the address as unverified.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn unverify(&mut self) -> Result<(), ResourceError> {
        self.verification("unverify").await
    }

    /// Returns the address's delivery preferences.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn preferences(&mut self) -> Result<Preferences, ResourceError> {
        let url = format!("{}/preferences", self.self_link().await?);
        Ok(Preferences::new(Arc::clone(self.connection()), url, None))
    }

    async fn verification(&mut self, action: &str) -> Result<(), ResourceError> {
        let path = build_path(
            "addresses/{email}/{action}",
            &[("email", self.email().await?.as_str()), ("action", action)],
        );
        self.connection()
            .call(&path, None, Some(HttpMethod::Post))
            .await?;
        self.reset_cache();
        Ok(())
    }
}

/// Marker for [`Addresses`].
#[derive(Debug)]
pub enum AddressesKind {}

impl ResourceKind for AddressesKind {
    type Fields = Map<String, Value>;
    const NAME: &'static str = "Addresses";
}

impl ListKind for AddressesKind {
    type Item = Address;
}

/// The addresses of a user (`users/{user_id}/addresses`).
pub type Addresses = RestList<AddressesKind>;

impl RestList<AddressesKind> {
    /// Returns the address matching `email`, if the user owns it.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn find_by_email(&mut self, email: &str) -> Result<Option<Address>, ResourceError> {
        for mut address in self.items().await? {
            if address.email().await? == email {
                return Ok(Some(address));
            }
        }
        Ok(None)
    }

    /// Deletes the address matching `email`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::AddressNotFound`] if the user does not own
    /// `email`, or the `DELETE` error.
    pub async fn remove_email(&mut self, email: &str) -> Result<(), ResourceError> {
        let mut address =
            self.find_by_email(email)
                .await?
                .ok_or_else(|| ResourceError::AddressNotFound {
                    address: email.to_string(),
                })?;
        address.delete().await?;
        self.reset_cache();
        Ok(())
    }
}
