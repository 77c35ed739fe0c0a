//! Mailing list configuration resource implementation.

use serde_json::{Map, Value};

use crate::rest::{ResourceKind, RestDict};

/// Marker for [`Settings`].
#[derive(Debug)]
pub enum SettingsKind {}

impl ResourceKind for SettingsKind {
    type Fields = Map<String, Value>;
    const NAME: &'static str = "Settings";
    const READ_ONLY_PROPERTIES: &'static [&'static str] = &[
        "bounces_address",
        "created_at",
        "digest_last_sent_at",
        "fqdn_listname",
        "join_address",
        "last_post_at",
        "leave_address",
        "list_id",
        "list_name",
        "mail_host",
        "next_digest_number",
        "no_reply_address",
        "owner_address",
        "post_id",
        "posting_address",
        "request_address",
        "scheme",
        "self_link",
        "volume",
        "web_host",
    ];
}

/// The configuration of a mailing list (`lists/{fqdn_listname}/config`).
///
/// Every key the server returns is visible; the computed ones are
/// read-only.
pub type Settings = RestDict<SettingsKind>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_computed_settings_are_read_only() {
        assert!(SettingsKind::check_writable("posting_address").is_err());
        assert!(SettingsKind::check_writable("self_link").is_err());
        assert!(SettingsKind::check_writable("description").is_ok());
        assert!(SettingsKind::is_visible("anything_the_server_sends"));
    }
}
