//! Ban list resource implementation.
//!
//! Bans exist per list (`lists/{list_id}/bans`) and site-wide (`bans`).
//! Both are served by [`Bans`]; each entry is a read-only [`BannedAddress`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clients::{FormData, HttpError};
use crate::rest::resources::common::location;
use crate::rest::resources::MailingList;
use crate::rest::{build_path, ListKind, ResourceError, ResourceKind, RestList, RestObject};

/// Data of a banned address.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct BannedAddressFields {
    pub email: String,
    /// `None` for site-wide bans.
    #[serde(default)]
    pub list_id: Option<String>,
    pub self_link: String,
}

/// Marker for [`BannedAddress`].
#[derive(Debug)]
pub enum BannedAddressKind {}

impl ResourceKind for BannedAddressKind {
    type Fields = BannedAddressFields;
    const NAME: &'static str = "BannedAddress";
    const PROPERTIES: Option<&'static [&'static str]> = Some(&["email", "list_id", "self_link"]);
    const WRITABLE_PROPERTIES: Option<&'static [&'static str]> = Some(&[]);
}

/// One banned address. Every field is read-only.
pub type BannedAddress = RestObject<BannedAddressKind>;

impl RestObject<BannedAddressKind> {
    /// Returns the banned address (or pattern).
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn email(&mut self) -> Result<String, ResourceError> {
        self.require_str("email").await
    }

    /// Returns the list the ban applies to, `None` for a site-wide ban.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn mailing_list(&mut self) -> Result<Option<MailingList>, ResourceError> {
        let connection = Arc::clone(self.connection());
        Ok(self.get_str("list_id").await?.map(|list_id| {
            MailingList::new(
                connection,
                build_path("lists/{list_id}", &[("list_id", list_id)]),
                None,
            )
        }))
    }
}

/// Marker for [`Bans`].
#[derive(Debug)]
pub enum BansKind {}

impl ResourceKind for BansKind {
    type Fields = Map<String, Value>;
    const NAME: &'static str = "Bans";
}

impl ListKind for BansKind {
    type Item = BannedAddress;
}

/// A ban list, per list or site-wide.
pub type Bans = RestList<BansKind>;

impl RestList<BansKind> {
    /// Returns `true` if `email` is banned.
    ///
    /// With the list loaded the cached entries are scanned; otherwise a
    /// single lookup of that address is made instead of fetching the list.
    ///
    /// # Errors
    ///
    /// Returns lookup errors other than 404.
    pub async fn contains(&self, email: &str) -> Result<bool, ResourceError> {
        if let Some(entries) = self.cached_entries() {
            return Ok(entries
                .iter()
                .any(|entry| entry.get("email").and_then(Value::as_str) == Some(email)));
        }

        let url = format!("{}/{email}", self.url());
        let result = self.connection().call(&url, None, None).await;
        match result {
            Ok(_) => Ok(true),
            Err(HttpError::Response(e)) if e.code == 404 => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Bans `email`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Conflict`] if it is already banned, or
    /// another `POST` error.
    pub async fn add(&mut self, email: &str) -> Result<BannedAddress, ResourceError> {
        tracing::debug!("Banning {} on {}", email, self.url());
        let form = FormData::new().field("email", email);
        let response = self
            .connection()
            .call(self.url(), Some(&form), None)
            .await?;
        self.reset_cache();
        let url = location(&response, self.url())?;
        Ok(BannedAddress::new(Arc::clone(self.connection()), url, None))
    }

    /// Returns the ban for `email`, if any.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn find_by_email(&mut self, email: &str) -> Result<Option<BannedAddress>, ResourceError> {
        for mut ban in self.items().await? {
            if ban.email().await? == email {
                return Ok(Some(ban));
            }
        }
        Ok(None)
    }

    /// Lifts the ban on `email`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotBanned`] if `email` is not banned, or the
    /// `DELETE` error.
    pub async fn remove_email(&mut self, email: &str) -> Result<(), ResourceError> {
        let mut ban = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| ResourceError::NotBanned {
                address: email.to_string(),
            })?;
        ban.delete().await?;
        self.reset_cache();
        Ok(())
    }
}
