//! Mailman REST API version definitions.
//!
//! This module provides the [`ApiVersion`] enum for choosing the version
//! segment appended to the REST API base URL.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Mailman Core REST API version.
///
/// Mailman Core serves every API version under its own path prefix
/// (`http://localhost:8001/3.0/`, `http://localhost:8001/3.1/`). Version 3.1
/// switched user and address identifiers to hex UUIDs; everything else is
/// shared.
///
/// # Example
///
/// ```rust
/// use mailman_client::ApiVersion;
///
/// let version: ApiVersion = "3.1".parse().unwrap();
/// assert_eq!(version, ApiVersion::V3_1);
/// assert_eq!(ApiVersion::default().to_string(), "3.0");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    /// API version 3.0, the version the web front-ends talk to.
    #[default]
    V3_0,
    /// API version 3.1 (UUIDs rendered as hex strings).
    V3_1,
    /// Any other version string, passed through verbatim.
    Custom(String),
}

impl ApiVersion {
    /// Returns the most recent known API version.
    #[must_use]
    pub const fn latest() -> Self {
        Self::V3_1
    }

    /// Returns `true` for versions this crate knows about.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V3_0 => f.write_str("3.0"),
            Self::V3_1 => f.write_str("3.1"),
            Self::Custom(version) => f.write_str(version),
        }
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "3.0" => Ok(Self::V3_0),
            "3.1" => Ok(Self::V3_1),
            other => {
                let mut parts = other.split('.');
                let valid = matches!(
                    (parts.next(), parts.next(), parts.next()),
                    (Some(major), Some(minor), None)
                        if !major.is_empty()
                            && !minor.is_empty()
                            && major.chars().all(|c| c.is_ascii_digit())
                            && minor.chars().all(|c| c.is_ascii_digit())
                );
                if valid {
                    Ok(Self::Custom(other.to_string()))
                } else {
                    Err(ConfigError::InvalidApiVersion {
                        version: other.to_string(),
                    })
                }
            }
        }
    }
}
