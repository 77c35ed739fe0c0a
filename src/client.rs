//! Entry point to the Mailman REST API.
//!
//! [`Client`] owns the shared [`Connection`] and builds the top-level
//! resources (domains, lists, users, members, queues, bans) from it.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::clients::{Connection, FormData, HttpMethod};
use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::rest::resources::{
    entries, from_body, location, materialize, Address, BannedAddress, Bans, Domain, MailingList,
    Member, Preferences, Queue, User,
};
use crate::rest::{build_path, with_query, Page, Resource, ResourceError};

/// Client for a Mailman Core REST API.
///
/// Cloning is cheap: clones share the same [`Connection`].
///
/// # Thread Safety
///
/// `Client` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use mailman_client::{Client, ClientConfig};
///
/// let config = ClientConfig::builder()
///     .base_url("http://localhost:8001")
///     .credentials("restadmin", "restpass")
///     .build()?;
/// let client = Client::new(&config)?;
///
/// for mut domain in client.domains().await? {
///     println!("{}", domain.mail_host().await?);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    connection: Arc<Connection>,
}

// Verify Client is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Client>();
};

impl Client {
    /// Creates a client for the server described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClientInit`] if the HTTP client cannot be
    /// built.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_connection(Arc::new(Connection::new(config)?)))
    }

    /// Creates a client over an existing connection.
    #[must_use]
    pub const fn from_connection(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    /// Returns the shared connection.
    #[must_use]
    pub const fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    /// Returns the server's version information (`system/versions`).
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn system(&self) -> Result<Value, ResourceError> {
        self.raw("system/versions").await
    }

    /// Returns the site-wide delivery preferences.
    #[must_use]
    pub fn preferences(&self) -> Preferences {
        Preferences::new(Arc::clone(&self.connection), "system/preferences", None)
    }

    /// Returns the server's pipelines (`system/pipelines`).
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn pipelines(&self) -> Result<Value, ResourceError> {
        self.raw("system/pipelines").await
    }

    /// Returns the server's chains (`system/chains`).
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn chains(&self) -> Result<Value, ResourceError> {
        self.raw("system/chains").await
    }

    /// Returns the processing queues, keyed by name.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn queues(&self) -> Result<BTreeMap<String, Queue>, ResourceError> {
        let response = self.connection.call("queues", None, None).await?;
        let mut queues = BTreeMap::new();
        for entry in entries(&response) {
            let name = entry
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| ResourceError::UnexpectedBody {
                    url: "queues".to_string(),
                    expected: "queue entries with a name",
                })?;
            queues.insert(name.to_string(), self.build::<Queue>(entry)?);
        }
        Ok(queues)
    }

    /// Returns every mailing list.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn lists(&self) -> Result<Vec<MailingList>, ResourceError> {
        self.get_lists(false).await
    }

    /// Returns the mailing lists, only advertised ones if asked.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn get_lists(&self, advertised: bool) -> Result<Vec<MailingList>, ResourceError> {
        self.collection(&lists_path(advertised)).await
    }

    /// Returns one page of the mailing lists.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn get_list_page(
        &self,
        count: u32,
        page: u32,
        advertised: bool,
    ) -> Result<Page<MailingList>, ResourceError> {
        Page::fetch(Arc::clone(&self.connection), lists_path(advertised), count, page).await
    }

    /// Returns every domain, sorted by mail host.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn domains(&self) -> Result<Vec<Domain>, ResourceError> {
        self.sorted_collection("domains", "mail_host").await
    }

    /// Returns every membership on the server.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn members(&self) -> Result<Vec<Member>, ResourceError> {
        self.collection("members").await
    }

    /// Returns the membership of `address` on `fqdn_listname`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] for an unknown list, or
    /// [`ResourceError::NotAMember`].
    pub async fn get_member(
        &self,
        fqdn_listname: &str,
        address: &str,
    ) -> Result<Member, ResourceError> {
        self.get_list(fqdn_listname)
            .await?
            .get_member(address)
            .await
    }

    /// Returns one page of all memberships.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn get_member_page(&self, count: u32, page: u32) -> Result<Page<Member>, ResourceError> {
        Page::fetch(Arc::clone(&self.connection), "members", count, page).await
    }

    /// Returns every user, sorted by self link.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn users(&self) -> Result<Vec<User>, ResourceError> {
        self.sorted_collection("users", "self_link").await
    }

    /// Returns one page of the users.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn get_user_page(&self, count: u32, page: u32) -> Result<Page<User>, ResourceError> {
        Page::fetch(Arc::clone(&self.connection), "users", count, page).await
    }

    /// Creates the domain `mail_host`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Conflict`] if the domain exists, or another
    /// `POST` error.
    pub async fn create_domain(
        &self,
        mail_host: &str,
        description: Option<&str>,
        owner: Option<&str>,
    ) -> Result<Domain, ResourceError> {
        tracing::debug!("Creating domain {}", mail_host);
        let form = FormData::new()
            .field("mail_host", mail_host)
            .optional_field("description", description)
            .optional_field("owner", owner);
        let response = self.connection.call("domains", Some(&form), None).await?;
        let url = location(&response, "domains")?;
        Ok(Domain::new(Arc::clone(&self.connection), url, None))
    }

    /// Deletes the domain `mail_host`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] for an unknown domain, or another
    /// `DELETE` error.
    pub async fn delete_domain(&self, mail_host: &str) -> Result<(), ResourceError> {
        let path = build_path("domains/{mail_host}", &[("mail_host", mail_host)]);
        self.connection
            .call(&path, None, Some(HttpMethod::Delete))
            .await?;
        Ok(())
    }

    /// Returns the domain `mail_host`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] for an unknown domain.
    pub async fn get_domain(&self, mail_host: &str) -> Result<Domain, ResourceError> {
        self.fetch(&build_path("domains/{mail_host}", &[("mail_host", mail_host)]))
            .await
    }

    /// Creates a user owning `email`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Conflict`] if the address is already taken,
    /// or another `POST` error.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<User, ResourceError> {
        tracing::debug!("Creating user for {}", email);
        let form = FormData::new()
            .field("display_name", display_name)
            .field("email", email)
            .field("password", password);
        let response = self.connection.call("users", Some(&form), None).await?;
        let url = location(&response, "users")?;
        Ok(User::new(Arc::clone(&self.connection), url, None))
    }

    /// Returns the user owning `address` (or with that user id).
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] for an unknown user.
    pub async fn get_user(&self, address: &str) -> Result<User, ResourceError> {
        self.fetch(&build_path("users/{address}", &[("address", address)]))
            .await
    }

    /// Returns the user owning `address`, `None` if there is none.
    ///
    /// Only a 404 means absent; every other failure is returned.
    ///
    /// # Errors
    ///
    /// Returns errors other than [`ResourceError::NotFound`].
    pub async fn find_user(&self, address: &str) -> Result<Option<User>, ResourceError> {
        let result = self.get_user(address).await;
        match result {
            Ok(user) => Ok(Some(user)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Returns the address resource for `address`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] for an unknown address.
    pub async fn get_address(&self, address: &str) -> Result<Address, ResourceError> {
        self.fetch(&build_path("addresses/{address}", &[("address", address)]))
            .await
    }

    /// Returns the list `fqdn_listname` (a posting address or a list id).
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] for an unknown list.
    pub async fn get_list(&self, fqdn_listname: &str) -> Result<MailingList, ResourceError> {
        self.fetch(&build_path(
            "lists/{fqdn_listname}",
            &[("fqdn_listname", fqdn_listname)],
        ))
        .await
    }

    /// Returns the list `fqdn_listname`, `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns errors other than [`ResourceError::NotFound`].
    pub async fn find_list(&self, fqdn_listname: &str) -> Result<Option<MailingList>, ResourceError> {
        let result = self.get_list(fqdn_listname).await;
        match result {
            Ok(list) => Ok(Some(list)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Deletes the list `fqdn_listname`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] for an unknown list, or another
    /// `DELETE` error.
    pub async fn delete_list(&self, fqdn_listname: &str) -> Result<(), ResourceError> {
        tracing::debug!("Deleting mailing list {}", fqdn_listname);
        let path = build_path("lists/{fqdn_listname}", &[("fqdn_listname", fqdn_listname)]);
        self.connection
            .call(&path, None, Some(HttpMethod::Delete))
            .await?;
        Ok(())
    }

    /// Returns the site-wide ban list.
    #[must_use]
    pub fn bans(&self) -> Bans {
        Bans::new(Arc::clone(&self.connection), "bans", None)
    }

    /// Returns one page of the site-wide bans.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn get_bans_page(
        &self,
        count: u32,
        page: u32,
    ) -> Result<Page<BannedAddress>, ResourceError> {
        Page::fetch(Arc::clone(&self.connection), "bans", count, page).await
    }

    async fn raw(&self, path: &str) -> Result<Value, ResourceError> {
        let response = self.connection.call(path, None, None).await?;
        Ok(response.body.unwrap_or(Value::Null))
    }

    async fn fetch<T: Resource>(&self, path: &str) -> Result<T, ResourceError> {
        let response = self.connection.call(path, None, None).await?;
        from_body(&self.connection, response, path)
    }

    async fn collection<T: Resource>(&self, path: &str) -> Result<Vec<T>, ResourceError> {
        let response = self.connection.call(path, None, None).await?;
        materialize(&self.connection, entries(&response))
    }

    async fn sorted_collection<T: Resource>(
        &self,
        path: &str,
        sort_key: &str,
    ) -> Result<Vec<T>, ResourceError> {
        let response = self.connection.call(path, None, None).await?;
        let mut sorted: Vec<&Value> = entries(&response).iter().collect();
        sorted.sort_by(|a, b| sort_value(a, sort_key).cmp(sort_value(b, sort_key)));
        sorted.into_iter().map(|entry| self.build(entry)).collect()
    }

    fn build<T: Resource>(&self, entry: &Value) -> Result<T, ResourceError> {
        T::from_entry(&self.connection, entry)
    }
}

fn sort_value<'a>(entry: &'a Value, key: &str) -> &'a str {
    entry.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn lists_path(advertised: bool) -> String {
    if advertised {
        with_query("lists", &[("advertised", "true")])
    } else {
        "lists".to_string()
    }
}
