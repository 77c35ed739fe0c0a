//! Configuration types for the Mailman REST client.
//!
//! # Overview
//!
//! - [`ClientConfig`]: everything needed to open a [`Connection`](crate::clients::Connection)
//! - [`ClientConfigBuilder`]: a builder for [`ClientConfig`]
//! - [`BaseUrl`]: a validated REST API root URL
//! - [`Credentials`]: Basic-Auth credentials with a masked debug output
//! - [`ApiVersion`]: the REST API version segment
//!
//! # Example
//!
//! ```rust
//! use mailman_client::{ApiVersion, ClientConfig};
//!
//! let config = ClientConfig::builder()
//!     .base_url("http://localhost:8001")
//!     .credentials("restadmin", "restpass")
//!     .api_version(ApiVersion::V3_1)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.api_root(), "http://localhost:8001/3.1/");
//! ```

mod newtypes;
mod version;

pub use newtypes::{BaseUrl, Credentials};
pub use version::ApiVersion;

use reqwest::header::HeaderValue;

use crate::error::ConfigError;

/// Environment variable holding the REST API root URL.
pub const ENV_REST_API_URL: &str = "MAILMAN_REST_API_URL";
/// Environment variable holding the REST API user name.
pub const ENV_REST_API_USER: &str = "MAILMAN_REST_API_USER";
/// Environment variable holding the REST API password.
pub const ENV_REST_API_PASS: &str = "MAILMAN_REST_API_PASS";

/// Configuration for a Mailman REST API client.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: BaseUrl,
    credentials: Option<Credentials>,
    api_version: ApiVersion,
    user_agent_prefix: Option<String>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Builds a configuration from the `MAILMAN_REST_API_*` environment
    /// variables.
    ///
    /// Unset or empty user/password variables are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if the URL variable is
    /// unset, and the usual validation errors otherwise.
    pub fn from_env() -> Result<Self, ConfigError> {
        let read = |name: &str| std::env::var(name).ok().filter(|value| !value.is_empty());

        let mut builder = Self::builder();
        if let Some(url) = read(ENV_REST_API_URL) {
            builder = builder.base_url(url);
        }
        if let Some(user) = read(ENV_REST_API_USER) {
            builder = builder.username(user);
        }
        if let Some(pass) = read(ENV_REST_API_PASS) {
            builder = builder.password(pass);
        }
        builder.build()
    }

    /// Returns the REST API root URL, without the version segment.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the Basic-Auth credentials, if configured.
    #[must_use]
    pub const fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Returns the API version.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the versioned API root every request path is joined to.
    ///
    /// Always ends with a slash.
    #[must_use]
    pub fn api_root(&self) -> String {
        format!("{}/{}/", self.base_url, self.api_version)
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// `base_url` is required. Credentials are optional but must be given as a
/// pair.
///
/// # Defaults
///
/// - `api_version`: [`ApiVersion::V3_0`]
/// - credentials: none
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    api_version: Option<ApiVersion>,
    user_agent_prefix: Option<String>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the REST API root URL (required).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets both Basic-Auth credentials at once.
    #[must_use]
    pub fn credentials(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username(username).password(password)
    }

    /// Sets the Basic-Auth user name.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the Basic-Auth password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingRequiredField`] if `base_url` is not set
    /// - [`ConfigError::InvalidBaseUrl`] if it does not parse
    /// - [`ConfigError::IncompleteCredentials`] if only one of user name and
    ///   password is set
    /// - [`ConfigError::InvalidUserAgentPrefix`] if the prefix is not a valid
    ///   header value
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "base_url" })?;
        let base_url = BaseUrl::new(base_url)?;
        let credentials = Credentials::from_parts(self.username, self.password)?;

        if let Some(prefix) = &self.user_agent_prefix {
            if HeaderValue::from_str(prefix).is_err() {
                return Err(ConfigError::InvalidUserAgentPrefix {
                    prefix: prefix.clone(),
                });
            }
        }

        Ok(ClientConfig {
            base_url,
            credentials,
            api_version: self.api_version.unwrap_or_default(),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientConfigBuilder::new().build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "base_url" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = ClientConfig::builder()
            .base_url("http://localhost:8001")
            .build()
            .unwrap();

        assert_eq!(config.api_version(), &ApiVersion::V3_0);
        assert!(config.credentials().is_none());
        assert!(config.user_agent_prefix().is_none());
        assert_eq!(config.api_root(), "http://localhost:8001/3.0/");
    }

    #[test]
    fn test_builder_rejects_user_agent_prefix_with_newline() {
        let result = ClientConfig::builder()
            .base_url("http://localhost:8001")
            .user_agent_prefix("Postorius/1.3\r\nX-Injected: yes")
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidUserAgentPrefix { .. })
        ));
    }

    #[test]
    fn test_builder_rejects_half_credentials() {
        let result = ClientConfig::builder()
            .base_url("http://localhost:8001")
            .password("restpass")
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::IncompleteCredentials {
                missing: "name",
                ..
            })
        ));
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let config = ClientConfig::builder()
            .base_url("https://lists.example.com/rest/")
            .credentials("restadmin", "restpass")
            .api_version(ApiVersion::V3_1)
            .user_agent_prefix("Postorius/1.3")
            .build()
            .unwrap();

        assert_eq!(config.base_url().as_ref(), "https://lists.example.com/rest");
        assert_eq!(config.credentials().unwrap().username(), "restadmin");
        assert_eq!(config.user_agent_prefix(), Some("Postorius/1.3"));
        assert_eq!(config.api_root(), "https://lists.example.com/rest/3.1/");
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientConfig>();
    }
}
