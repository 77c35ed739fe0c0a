//! Domain resource implementation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clients::{FormData, HttpMethod};
use crate::rest::resources::common::{entries, location, materialize};
use crate::rest::resources::{MailingList, User};
use crate::rest::{build_path, with_query, Page, ResourceError, ResourceKind, RestObject};

/// Data of a Mailman domain.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DomainFields {
    pub mail_host: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub alias_domain: Option<String>,
    pub self_link: String,
}

/// Marker for [`Domain`].
#[derive(Debug)]
pub enum DomainKind {}

impl ResourceKind for DomainKind {
    type Fields = DomainFields;
    const NAME: &'static str = "Domain";
    const PROPERTIES: Option<&'static [&'static str]> =
        Some(&["description", "mail_host", "self_link"]);
}

/// A mail domain hosting mailing lists.
pub type Domain = RestObject<DomainKind>;

impl RestObject<DomainKind> {
    /// Returns the domain's mail host (e.g. `example.com`).
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn mail_host(&mut self) -> Result<String, ResourceError> {
        self.require_str("mail_host").await
    }

    /// Returns the domain's description.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn description(&mut self) -> Result<Option<String>, ResourceError> {
        self.get_str("description").await
    }

    /// Returns the domain owners.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn owners(&self) -> Result<Vec<User>, ResourceError> {
        let url = format!("{}/owners", self.url());
        let response = self.connection().call(&url, None, None).await?;
        materialize(self.connection(), entries(&response))
    }

    /// Adds an owner by email address.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn add_owner(&self, owner: &str) -> Result<(), ResourceError> {
        let url = format!("{}/owners", self.url());
        let form = FormData::new().field("owner", owner);
        self.connection().call(&url, Some(&form), None).await?;
        Ok(())
    }

    /// Removes every owner of the domain.
    ///
    /// # Errors
    ///
    /// Returns the `DELETE` error.
    pub async fn remove_all_owners(&self) -> Result<(), ResourceError> {
        let url = format!("{}/owners", self.url());
        self.connection()
            .call(&url, None, Some(HttpMethod::Delete))
            .await?;
        Ok(())
    }

    /// Returns every list in the domain.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn lists(&mut self) -> Result<Vec<MailingList>, ResourceError> {
        self.get_lists(false).await
    }

    /// Returns the lists in the domain, only advertised ones if asked.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn get_lists(&mut self, advertised: bool) -> Result<Vec<MailingList>, ResourceError> {
        let path = self.lists_path(advertised).await?;
        let response = self.connection().call(&path, None, None).await?;
        materialize(self.connection(), entries(&response))
    }

    /// Returns one page of the lists in the domain.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn get_list_page(
        &mut self,
        count: u32,
        page: u32,
        advertised: bool,
    ) -> Result<Page<MailingList>, ResourceError> {
        let path = self.lists_path(advertised).await?;
        Page::fetch(Arc::clone(self.connection()), path, count, page).await
    }

    /// Creates `{list_name}@{mail_host}`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Conflict`] if the list exists, or another
    /// `POST` error.
    pub async fn create_list(&mut self, list_name: &str) -> Result<MailingList, ResourceError> {
        let fqdn_listname = format!("{list_name}@{}", self.mail_host().await?);
        tracing::debug!("Creating mailing list {}", fqdn_listname);
        let form = FormData::new().field("fqdn_listname", fqdn_listname);
        let response = self.connection().call("lists", Some(&form), None).await?;
        let url = location(&response, "lists")?;
        Ok(MailingList::new(Arc::clone(self.connection()), url, None))
    }

    async fn lists_path(&mut self, advertised: bool) -> Result<String, ResourceError> {
        let path = build_path(
            "domains/{mail_host}/lists",
            &[("mail_host", self.mail_host().await?)],
        );
        Ok(if advertised {
            with_query(&path, &[("advertised", "true")])
        } else {
            path
        })
    }
}
