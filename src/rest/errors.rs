//! Resource-level error types.
//!
//! This module extends [`HttpError`] with the semantics resource code cares
//! about.
//!
//! # Error Handling
//!
//! HTTP status codes are mapped to semantic variants:
//!
//! - **404**: [`ResourceError::NotFound`]
//! - **409**: [`ResourceError::Conflict`] (duplicate create, already banned, ...)
//! - **Other non-2xx and transport failures**: [`ResourceError::Http`]
//!
//! The remaining variants are local contract violations that are detected
//! without talking to the server (writing a read-only field, looking up an
//! unknown field, removing an address that is not there).
//!
//! # Example
//!
//! ```rust,ignore
//! use mailman_client::rest::ResourceError;
//!
//! match bans.add("spammer@example.com").await {
//!     Ok(ban) => println!("banned {}", ban.url()),
//!     Err(ResourceError::Conflict(_)) => println!("is already banned"),
//!     Err(e) => return Err(e.into()),
//! }
//! ```

use thiserror::Error;

use crate::clients::{HttpError, HttpResponseError};

/// Error type for resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The server answered 404.
    #[error("Not found: {}", .0.url)]
    NotFound(HttpResponseError),

    /// The server answered 409.
    #[error("Conflict at {}: {}", .0.url, .0.body)]
    Conflict(HttpResponseError),

    /// Any other HTTP or transport error.
    #[error(transparent)]
    Http(HttpError),

    /// The field cannot be written on this kind of resource.
    #[error("{resource}.{field} is read-only")]
    ReadOnlyField {
        /// The resource kind.
        resource: &'static str,
        /// The field that was written.
        field: String,
    },

    /// The field is not part of this resource kind's property list.
    #[error("'{resource}' object has no attribute '{field}'")]
    UnknownField {
        /// The resource kind.
        resource: &'static str,
        /// The field that was requested.
        field: String,
    },

    /// The field is absent from the resource's data.
    #[error("{resource} at {url} has no field '{field}'")]
    MissingField {
        /// The resource kind.
        resource: &'static str,
        /// The resource URL.
        url: String,
        /// The missing field.
        field: String,
    },

    /// Keys of a REST dictionary cannot be deleted.
    #[error("{resource} keys can't be deleted")]
    KeyDeletionUnsupported {
        /// The resource kind.
        resource: &'static str,
    },

    /// A list index past the end of a REST list.
    #[error("{resource} index {index} out of range (length {len})")]
    IndexOutOfRange {
        /// The resource kind.
        resource: &'static str,
        /// The requested index.
        index: usize,
        /// The length of the list.
        len: usize,
    },

    /// No page can follow the last representable page number.
    #[error("No page follows page {page} of {url}")]
    PageOutOfRange {
        /// The URL of the current page.
        url: String,
        /// The current page number.
        page: u32,
    },

    /// The address has no membership on the list.
    #[error("{address} is not a member address of {list}")]
    NotAMember {
        /// The address that was looked up.
        address: String,
        /// The list's fully qualified name.
        list: String,
    },

    /// The address is not in the ban list.
    #[error("The address {address} is not banned")]
    NotBanned {
        /// The address.
        address: String,
    },

    /// The address does not belong to the user.
    #[error("The address {address} does not exist")]
    AddressNotFound {
        /// The address.
        address: String,
    },

    /// A 2xx response body did not have the expected shape.
    #[error("Unexpected response body from {url}: expected {expected}")]
    UnexpectedBody {
        /// The resource URL.
        url: String,
        /// What the body should have looked like.
        expected: &'static str,
    },

    /// A resource-creating call returned no `Location` header.
    #[error("Response from {url} has no Location header")]
    MissingLocation {
        /// The URL that was called.
        url: String,
    },

    /// The cached data could not be decoded into the typed fields.
    #[error("Failed to decode {resource} fields: {source}")]
    Deserialize {
        /// The resource kind.
        resource: &'static str,
        /// The decode error.
        #[source]
        source: serde_json::Error,
    },
}

impl From<HttpError> for ResourceError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Response(e) if e.code == 404 => Self::NotFound(e),
            HttpError::Response(e) if e.code == 409 => Self::Conflict(e),
            other => Self::Http(other),
        }
    }
}

impl ResourceError {
    /// Returns the HTTP status code when the error came from a response.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::NotFound(e) | Self::Conflict(e) => Some(e.code),
            Self::Http(e) => e.status_code(),
            _ => None,
        }
    }

    /// Returns `true` for [`ResourceError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` for [`ResourceError::Conflict`].
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns `true` when the server could not be reached.
    #[must_use]
    pub const fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Http(HttpError::Connection(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn http_error(code: u16) -> HttpError {
        HttpError::Response(HttpResponseError {
            code,
            url: "http://localhost:8001/3.0/lists/ant@example.com/bans".to_string(),
            body: String::new(),
            headers: HashMap::new(),
        })
    }

    #[test]
    fn test_404_maps_to_not_found() {
        let error = ResourceError::from(http_error(404));
        assert!(error.is_not_found());
        assert_eq!(error.status_code(), Some(404));
    }

    #[test]
    fn test_409_maps_to_conflict() {
        let error = ResourceError::from(http_error(409));
        assert!(error.is_conflict());
        assert_eq!(error.status_code(), Some(409));
    }

    #[test]
    fn test_other_codes_stay_http_errors() {
        let error = ResourceError::from(http_error(500));
        assert!(matches!(error, ResourceError::Http(_)));
        assert_eq!(error.status_code(), Some(500));
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_local_errors_have_no_status_code() {
        let error = ResourceError::ReadOnlyField {
            resource: "MailingList",
            field: "self_link".to_string(),
        };
        assert_eq!(error.status_code(), None);
        assert_eq!(error.to_string(), "MailingList.self_link is read-only");
    }

    #[test]
    fn test_unknown_field_message_reads_like_attribute_error() {
        let error = ResourceError::UnknownField {
            resource: "Member",
            field: "nickname".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "'Member' object has no attribute 'nickname'"
        );
    }

    #[test]
    fn test_not_a_member_message() {
        let error = ResourceError::NotAMember {
            address: "bob@example.com".to_string(),
            list: "ant@example.com".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "bob@example.com is not a member address of ant@example.com"
        );
    }
}
