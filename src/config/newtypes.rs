//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;

/// A validated Mailman REST API root URL.
///
/// The URL must be absolute with an `http` or `https` scheme. Trailing
/// slashes are removed so that the API version segment can be appended
/// uniformly.
///
/// # Example
///
/// ```rust
/// use mailman_client::BaseUrl;
///
/// let url = BaseUrl::new("http://localhost:8001/").unwrap();
/// assert_eq!(url.as_ref(), "http://localhost:8001");
/// assert!(BaseUrl::new("localhost:8001").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL cannot be parsed or
    /// does not use `http`/`https`.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let trimmed = url.trim().trim_end_matches('/');
        let parsed = reqwest::Url::parse(trimmed).map_err(|_| ConfigError::InvalidBaseUrl {
            url: url.clone(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl { url });
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Basic-Auth credentials for the REST API.
///
/// The password is masked in debug output.
///
/// # Example
///
/// ```rust
/// use mailman_client::Credentials;
///
/// let credentials = Credentials::new("restadmin", "restpass");
/// assert_eq!(credentials.username(), "restadmin");
/// assert!(!format!("{credentials:?}").contains("restpass"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates a new credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Builds credentials from two optional halves.
    ///
    /// Returns `Ok(None)` when neither half is present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IncompleteCredentials`] when only one half is
    /// present.
    pub fn from_parts(
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        match (username, password) {
            (Some(username), Some(password)) => Ok(Some(Self { username, password })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::IncompleteCredentials {
                given: "name",
                missing: "password",
            }),
            (None, Some(_)) => Err(ConfigError::IncompleteCredentials {
                given: "password",
                missing: "name",
            }),
        }
    }

    /// Returns the user name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the value of the `Authorization` header for these credentials.
    #[must_use]
    pub fn basic_auth_header(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"*****")
            .finish()
    }
}
