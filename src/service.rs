//! Account-level helpers on top of [`Client`].
//!
//! A web front end keeps its own user accounts and maps each one to a
//! Mailman user by email address. [`MailmanService`] does that mapping,
//! creating the Mailman user on first use, and caches the results in an
//! injected [`Cache`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use serde_json::Value;

use crate::cache::Cache;
use crate::client::Client;
use crate::rest::resources::{MemberRole, User};
use crate::rest::ResourceError;

/// Cache version of the subscriptions map.
const SUBSCRIPTIONS_CACHE_VERSION: u32 = 2;

/// Lifetime of a cached subscriptions map, in seconds.
const SUBSCRIPTIONS_CACHE_TTL_SECS: i64 = 60;

/// The front-end account a Mailman user is looked up for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Identifier of the account in the front end.
    pub id: String,
    /// Primary email address.
    pub email: String,
    /// Name used when the Mailman user has to be created.
    pub display_name: String,
}

impl Account {
    /// Creates an account description.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: display_name.into(),
        }
    }

    fn user_id_key(&self) -> String {
        format!("User:{}:mailman_user_id", self.id)
    }

    fn subscriptions_key(&self) -> String {
        format!("User:{}:subscriptions", self.id)
    }
}

/// Maps front-end accounts to Mailman users.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use mailman_client::{Account, Cache, Client, ClientConfig, MailmanService};
///
/// let client = Client::new(&ClientConfig::from_env()?)?;
/// let service = MailmanService::new(client, Arc::new(Cache::new("mailman")));
///
/// let account = Account::new("42", "anne@example.com", "Anne Person");
/// let subscriptions = service.get_subscriptions(&account).await?;
/// ```
#[derive(Debug, Clone)]
pub struct MailmanService {
    client: Client,
    cache: Arc<Cache<Value>>,
}

impl MailmanService {
    /// Creates a service using `client` and sharing `cache`.
    #[must_use]
    pub const fn new(client: Client, cache: Arc<Cache<Value>>) -> Self {
        Self { client, cache }
    }

    /// Returns the underlying client.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Returns the Mailman user of `account`, creating it if needed.
    ///
    /// The Mailman user id is cached without expiry. On a cache miss the
    /// user is looked up by email, and created (without a password) only
    /// if the server answers 404.
    ///
    /// # Errors
    ///
    /// Returns the lookup or creation error.
    pub async fn get_mailman_user(&self, account: &Account) -> Result<User, ResourceError> {
        let result = self.lookup_or_create(account).await;
        if let Err(e) = &result {
            tracing::warn!(
                "Error getting or creating the Mailman user of {} ({}): {}",
                account.id,
                account.email,
                e
            );
        }
        result
    }

    /// Returns the lists `account` is subscribed to, mapped to the
    /// subscribed address. Non-member entries are left out.
    ///
    /// The map is cached for a minute.
    ///
    /// # Errors
    ///
    /// Returns the lookup error.
    pub async fn get_subscriptions(
        &self,
        account: &Account,
    ) -> Result<BTreeMap<String, String>, ResourceError> {
        let value = self
            .cache
            .get_or_set_versioned(
                &account.subscriptions_key(),
                Some(Duration::seconds(SUBSCRIPTIONS_CACHE_TTL_SECS)),
                SUBSCRIPTIONS_CACHE_VERSION,
                || async { self.fetch_subscriptions(account).await.map(to_value) },
            )
            .await?;
        serde_json::from_value(value).map_err(|source| ResourceError::Deserialize {
            resource: "subscriptions",
            source,
        })
    }

    /// Attaches `address` to the Mailman user of `account` and marks it
    /// verified.
    ///
    /// An address owned by another Mailman user is taken over.
    ///
    /// # Errors
    ///
    /// Returns the lookup, `POST` or verification error.
    pub async fn add_address(&self, account: &Account, address: &str) -> Result<(), ResourceError> {
        tracing::debug!("Associating address {} with account {}", address, account.id);
        let mut user = self.get_mailman_user(account).await?;

        let existing = user.addresses().await?.find_by_email(address).await?;
        let mut mm_address = match existing {
            Some(mm_address) => mm_address,
            None => {
                let result = user.add_address(address, true).await;
                match result {
                    Ok(mm_address) => mm_address,
                    Err(e) => {
                        tracing::warn!("Can't add {} to {}: {}", address, account.id, e);
                        return Err(e);
                    }
                }
            }
        };
        if !mm_address.verified().await? {
            mm_address.verify().await?;
        }
        Ok(())
    }

    async fn lookup_or_create(&self, account: &Account) -> Result<User, ResourceError> {
        let key = account.user_id_key();
        if let Some(Value::String(user_id)) = self.cache.get(&key).await {
            return self.client.get_user(&user_id).await;
        }

        let found = self.client.find_user(&account.email).await?;
        let mut user = match found {
            Some(user) => user,
            None => {
                let user = self
                    .client
                    .create_user(&account.email, "", &account.display_name)
                    .await?;
                tracing::info!(
                    "Created Mailman user for {} ({})",
                    account.id,
                    account.email
                );
                user
            }
        };
        let user_id = user.user_id().await?;
        self.cache.set(&key, Value::String(user_id), None).await;
        Ok(user)
    }

    async fn fetch_subscriptions(
        &self,
        account: &Account,
    ) -> Result<BTreeMap<String, String>, ResourceError> {
        let mut user = self.get_mailman_user(account).await?;
        let mut subscriptions = BTreeMap::new();
        for mut member in user.subscriptions().await? {
            if member.role().await? == MemberRole::Nonmember {
                continue;
            }
            subscriptions.insert(member.list_id().await?, member.email().await?);
        }
        Ok(subscriptions)
    }
}

fn to_value(subscriptions: BTreeMap<String, String>) -> Value {
    Value::Object(
        subscriptions
            .into_iter()
            .map(|(list_id, email)| (list_id, Value::String(email)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_keys() {
        let account = Account::new("42", "anne@example.com", "Anne");
        assert_eq!(account.user_id_key(), "User:42:mailman_user_id");
        assert_eq!(account.subscriptions_key(), "User:42:subscriptions");
    }

    #[test]
    fn test_subscriptions_round_trip_through_json() {
        let mut subscriptions = BTreeMap::new();
        subscriptions.insert("ant.example.com".to_string(), "anne@example.com".to_string());
        let value = to_value(subscriptions.clone());
        let back: BTreeMap<String, String> = serde_json::from_value(value).unwrap();
        assert_eq!(back, subscriptions);
    }
}
