//! Mailing list resource implementation.
//!
//! Besides the list itself this module holds the list-scoped helpers:
//! [`ListArchivers`], [`SubscribeParams`], [`SubscriptionResult`] and
//! [`SubscriptionRequest`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clients::{FormData, HttpError, HttpMethod, HttpResponse};
use crate::rest::resources::common::{
    entries, from_body, location, materialize, MemberRole, ModerationDecision,
};
use crate::rest::resources::{
    BannedAddress, Bans, HeaderMatches, HeldMessage, Member, Settings,
};
use crate::rest::{
    build_path, with_query, Page, ResourceError, ResourceKind, RestDict, RestObject,
};

/// Data of a mailing list.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct MailingListFields {
    pub display_name: String,
    pub fqdn_listname: String,
    pub list_id: String,
    pub list_name: String,
    pub mail_host: String,
    #[serde(default)]
    pub member_count: u64,
    #[serde(default)]
    pub volume: u64,
    #[serde(default)]
    pub description: Option<String>,
    pub self_link: String,
}

/// Marker for [`MailingList`].
#[derive(Debug)]
pub enum MailingListKind {}

impl ResourceKind for MailingListKind {
    type Fields = MailingListFields;
    const NAME: &'static str = "MailingList";
    const PROPERTIES: Option<&'static [&'static str]> = Some(&[
        "display_name",
        "fqdn_listname",
        "list_id",
        "list_name",
        "mail_host",
        "member_count",
        "volume",
        "self_link",
    ]);
}

/// A mailing list.
pub type MailingList = RestObject<MailingListKind>;

/// Marker for [`ListArchivers`].
#[derive(Debug)]
pub enum ListArchiversKind {}

impl ResourceKind for ListArchiversKind {
    type Fields = BTreeMap<String, bool>;
    const NAME: &'static str = "ListArchivers";
    const AUTOSAVE: bool = true;
}

/// Which site-wide archivers are enabled for a list.
///
/// Every write is sent immediately.
pub type ListArchivers = RestDict<ListArchiversKind>;

/// Options for [`MailingList::subscribe`](RestObject::subscribe).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscribeParams {
    /// The subscriber's display name.
    pub display_name: Option<String>,
    /// The address has already been verified.
    pub pre_verified: bool,
    /// The subscriber has already confirmed.
    pub pre_confirmed: bool,
    /// A moderator has already approved.
    pub pre_approved: bool,
}

/// A subscription waiting for confirmation or approval.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PendingSubscription {
    /// Token identifying the pending request.
    pub token: String,
    /// Who must act next (`subscriber` or `moderator`).
    pub token_owner: String,
}

/// Outcome of a subscription attempt.
#[derive(Debug)]
pub enum SubscriptionResult {
    /// The address is now a member.
    Subscribed(Member),
    /// The server accepted the request but holds it (HTTP 202).
    Pending(PendingSubscription),
}

impl SubscriptionResult {
    /// Returns the member if the subscription took effect.
    #[must_use]
    pub fn member(self) -> Option<Member> {
        match self {
            Self::Subscribed(member) => Some(member),
            Self::Pending(_) => None,
        }
    }

    /// Returns `true` for a held subscription.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

/// A subscription request awaiting moderation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub email: String,
    pub token: String,
    pub token_owner: String,
    pub list_id: String,
    #[serde(rename = "when")]
    pub request_date: NaiveDateTime,
}

impl RestObject<MailingListKind> {
    /// Returns the list's posting address (e.g. `ant@example.com`).
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn fqdn_listname(&mut self) -> Result<String, ResourceError> {
        self.require_str("fqdn_listname").await
    }

    /// Returns the list identifier (e.g. `ant.example.com`).
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn list_id(&mut self) -> Result<String, ResourceError> {
        self.require_str("list_id").await
    }

    /// Returns the owners' email addresses.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn owners(&self) -> Result<Vec<String>, ResourceError> {
        self.roster_emails("owner").await
    }

    /// Returns the moderators' email addresses.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn moderators(&self) -> Result<Vec<String>, ResourceError> {
        self.roster_emails("moderator").await
    }

    async fn roster_emails(&self, role: &str) -> Result<Vec<String>, ResourceError> {
        let url = format!("{}/roster/{role}", self.url());
        let response = self.connection().call(&url, None, None).await?;
        Ok(entries(&response)
            .iter()
            .filter_map(|entry| entry.get("email").and_then(Value::as_str))
            .map(ToString::to_string)
            .collect())
    }

    /// Returns the members, ordered by address.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn members(&mut self) -> Result<Vec<Member>, ResourceError> {
        let path = self.roster_path().await?;
        let response = self.connection().call(&path, None, None).await?;
        materialize(self.connection(), &sorted_by_address(entries(&response)))
    }

    /// Returns the nonmembers, ordered by address.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn nonmembers(&mut self) -> Result<Vec<Member>, ResourceError> {
        let form = FormData::new()
            .field("role", MemberRole::Nonmember.as_str())
            .field("list_id", self.list_id().await?);
        let response = self
            .connection()
            .call("members/find", Some(&form), None)
            .await?;
        materialize(self.connection(), &sorted_by_address(entries(&response)))
    }

    /// Returns one page of members.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn get_member_page(
        &mut self,
        count: u32,
        page: u32,
    ) -> Result<Page<Member>, ResourceError> {
        let path = self.roster_path().await?;
        Page::fetch(Arc::clone(self.connection()), path, count, page).await
    }

    /// Finds memberships of `address` with `role` on this list.
    ///
    /// # Errors
    ///
    /// Returns the search error.
    pub async fn find_members(
        &mut self,
        address: &str,
        role: MemberRole,
    ) -> Result<Vec<Member>, ResourceError> {
        let form = self.find_form(address, role).await?;
        let response = self
            .connection()
            .call("members/find", Some(&form), None)
            .await?;
        materialize(self.connection(), entries(&response))
    }

    /// Finds memberships of `address` with `role`, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns the search error.
    pub async fn find_members_page(
        &mut self,
        address: &str,
        role: MemberRole,
        count: u32,
        page: u32,
    ) -> Result<Page<Member>, ResourceError> {
        let form = self.find_form(address, role).await?;
        let path = with_query("members/find", &pairs_of(&form));
        Page::fetch(Arc::clone(self.connection()), path, count, page).await
    }

    async fn find_form(
        &mut self,
        address: &str,
        role: MemberRole,
    ) -> Result<FormData, ResourceError> {
        Ok(FormData::new()
            .field("subscriber", address)
            .field("role", role.as_str())
            .field("list_id", self.list_id().await?))
    }

    /// Returns the list's configuration.
    ///
    /// A new handle is returned on every call, so each starts unloaded.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn settings(&mut self) -> Result<Settings, ResourceError> {
        let path = build_path(
            "lists/{fqdn_listname}/config",
            &[("fqdn_listname", self.fqdn_listname().await?)],
        );
        Ok(Settings::new(Arc::clone(self.connection()), path, None))
    }

    /// Returns the held messages.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn held(&mut self) -> Result<Vec<HeldMessage>, ResourceError> {
        let path = self.held_path().await?;
        let response = self
            .connection()
            .call(&path, None, Some(HttpMethod::Get))
            .await?;
        materialize(self.connection(), entries(&response))
    }

    /// Returns one page of held messages.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn get_held_page(
        &mut self,
        count: u32,
        page: u32,
    ) -> Result<Page<HeldMessage>, ResourceError> {
        let path = self.held_path().await?;
        Page::fetch(Arc::clone(self.connection()), path, count, page).await
    }

    /// Returns the held message `held_id` (fetched lazily).
    ///
    /// # Errors
    ///
    /// Returns the fetch error for the list's name.
    pub async fn get_held_message(&mut self, held_id: u64) -> Result<HeldMessage, ResourceError> {
        let path = format!("{}/{held_id}", self.held_path().await?);
        Ok(HeldMessage::new(Arc::clone(self.connection()), path, None))
    }

    /// Returns the subscription requests awaiting moderation.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or [`ResourceError::Deserialize`] for a
    /// malformed request.
    pub async fn requests(&mut self) -> Result<Vec<SubscriptionRequest>, ResourceError> {
        let path = build_path(
            "lists/{fqdn_listname}/requests",
            &[("fqdn_listname", self.fqdn_listname().await?)],
        );
        let response = self
            .connection()
            .call(&path, None, Some(HttpMethod::Get))
            .await?;
        entries(&response)
            .iter()
            .map(|entry| {
                SubscriptionRequest::deserialize(entry).map_err(|source| {
                    ResourceError::Deserialize {
                        resource: "SubscriptionRequest",
                        source,
                    }
                })
            })
            .collect()
    }

    /// Returns the list's archiver switches.
    ///
    /// # Errors
    ///
    /// Returns the fetch error for the list's id.
    pub async fn archivers(&mut self) -> Result<ListArchivers, ResourceError> {
        let path = build_path(
            "lists/{list_id}/archivers",
            &[("list_id", self.list_id().await?)],
        );
        Ok(ListArchivers::new(Arc::clone(self.connection()), path, None))
    }

    /// Turns archivers on or off with a single `PATCH`.
    ///
    /// # Errors
    ///
    /// Returns the fetch or `PATCH` error.
    pub async fn set_archivers<I, S>(&mut self, switches: I) -> Result<(), ResourceError>
    where
        I: IntoIterator<Item = (S, bool)>,
        S: AsRef<str>,
    {
        let mut archivers = self.archivers().await?;
        archivers.update(switches).await?;
        archivers.save().await
    }

    /// Makes `address` an owner.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn add_owner(&mut self, address: &str) -> Result<(), ResourceError> {
        self.add_role(MemberRole::Owner, address).await
    }

    /// Makes `address` a moderator.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn add_moderator(&mut self, address: &str) -> Result<(), ResourceError> {
        self.add_role(MemberRole::Moderator, address).await
    }

    /// Gives `address` `role` on this list.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn add_role(&mut self, role: MemberRole, address: &str) -> Result<(), ResourceError> {
        let form = FormData::new()
            .field("list_id", self.list_id().await?)
            .field("subscriber", address)
            .field("role", role.as_str());
        self.connection().call("members", Some(&form), None).await?;
        Ok(())
    }

    /// Removes `address` from the owners.
    ///
    /// # Errors
    ///
    /// Returns the `DELETE` error.
    pub async fn remove_owner(&mut self, address: &str) -> Result<(), ResourceError> {
        self.remove_role(MemberRole::Owner, address).await
    }

    /// Removes `address` from the moderators.
    ///
    /// # Errors
    ///
    /// Returns the `DELETE` error.
    pub async fn remove_moderator(&mut self, address: &str) -> Result<(), ResourceError> {
        self.remove_role(MemberRole::Moderator, address).await
    }

    /// Takes `role` away from `address`.
    ///
    /// # Errors
    ///
    /// Returns the `DELETE` error.
    pub async fn remove_role(
        &mut self,
        role: MemberRole,
        address: &str,
    ) -> Result<(), ResourceError> {
        let path = build_path(
            "lists/{fqdn_listname}/{role}/{address}",
            &[
                ("fqdn_listname", self.fqdn_listname().await?.as_str()),
                ("role", role.as_str()),
                ("address", address),
            ],
        );
        self.connection()
            .call(&path, None, Some(HttpMethod::Delete))
            .await?;
        Ok(())
    }

    /// Applies `action` to the held message `request_id`.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn moderate_message(
        &mut self,
        request_id: u64,
        action: ModerationDecision,
    ) -> Result<HttpResponse, ResourceError> {
        let path = format!("{}/{request_id}", self.held_path().await?);
        let form = FormData::new().field("action", action.as_str());
        Ok(self
            .connection()
            .call(&path, Some(&form), Some(HttpMethod::Post))
            .await?)
    }

    /// Accepts a held message.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn accept_message(&mut self, request_id: u64) -> Result<HttpResponse, ResourceError> {
        self.moderate_message(request_id, ModerationDecision::Accept)
            .await
    }

    /// Rejects a held message.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn reject_message(&mut self, request_id: u64) -> Result<HttpResponse, ResourceError> {
        self.moderate_message(request_id, ModerationDecision::Reject)
            .await
    }

    /// Discards a held message.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn discard_message(&mut self, request_id: u64) -> Result<HttpResponse, ResourceError> {
        self.moderate_message(request_id, ModerationDecision::Discard)
            .await
    }

    /// Defers a held message.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn defer_message(&mut self, request_id: u64) -> Result<HttpResponse, ResourceError> {
        self.moderate_message(request_id, ModerationDecision::Defer)
            .await
    }

    /// Applies `action` to the subscription request `token`.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn moderate_request(
        &mut self,
        token: &str,
        action: ModerationDecision,
    ) -> Result<HttpResponse, ResourceError> {
        let path = build_path(
            "lists/{list_id}/requests/{token}",
            &[("list_id", self.list_id().await?.as_str()), ("token", token)],
        );
        let form = FormData::new().field("action", action.as_str());
        Ok(self.connection().call(&path, Some(&form), None).await?)
    }

    /// Accepts a subscription request.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn accept_request(&mut self, token: &str) -> Result<HttpResponse, ResourceError> {
        self.moderate_request(token, ModerationDecision::Accept).await
    }

    /// Rejects a subscription request.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn reject_request(&mut self, token: &str) -> Result<HttpResponse, ResourceError> {
        self.moderate_request(token, ModerationDecision::Reject).await
    }

    /// Discards a subscription request.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn discard_request(&mut self, token: &str) -> Result<HttpResponse, ResourceError> {
        self.moderate_request(token, ModerationDecision::Discard).await
    }

    /// Defers a subscription request.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error.
    pub async fn defer_request(&mut self, token: &str) -> Result<HttpResponse, ResourceError> {
        self.moderate_request(token, ModerationDecision::Defer).await
    }

    /// Returns the membership of `email`, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns fetch errors other than 404.
    pub async fn find_member(&mut self, email: &str) -> Result<Option<Member>, ResourceError> {
        let path = self.member_path(email).await?;
        let result = self.connection().call(&path, None, None).await;
        match result {
            Ok(response) => from_body(self.connection(), response, &path).map(Some),
            Err(HttpError::Response(e)) if e.code == 404 => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the membership of `email`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotAMember`] when the server refuses the
    /// lookup, or the transport error.
    pub async fn get_member(&mut self, email: &str) -> Result<Member, ResourceError> {
        let path = self.member_path(email).await?;
        let result = self.connection().call(&path, None, None).await;
        match result {
            Ok(response) => from_body(self.connection(), response, &path),
            Err(HttpError::Response(_)) => Err(self.not_a_member(email).await),
            Err(e) => Err(e.into()),
        }
    }

    /// Subscribes `address` to the list.
    ///
    /// # Errors
    ///
    /// Returns the `POST` error, or [`ResourceError::MissingLocation`] if
    /// the server created the member without saying where.
    pub async fn subscribe(
        &mut self,
        address: &str,
        params: SubscribeParams,
    ) -> Result<SubscriptionResult, ResourceError> {
        let mut form = FormData::new()
            .field("list_id", self.list_id().await?)
            .field("subscriber", address)
            .optional_field("display_name", params.display_name);
        if params.pre_verified {
            form = form.field("pre_verified", true);
        }
        if params.pre_confirmed {
            form = form.field("pre_confirmed", true);
        }
        if params.pre_approved {
            form = form.field("pre_approved", true);
        }

        tracing::debug!("Subscribing {} to {}", address, self.url());
        let response = self.connection().call("members", Some(&form), None).await?;

        if response.is_accepted() {
            let pending: PendingSubscription = response
                .body
                .map(serde_json::from_value)
                .transpose()
                .map_err(|source| ResourceError::Deserialize {
                    resource: "PendingSubscription",
                    source,
                })?
                .unwrap_or_default();
            return Ok(SubscriptionResult::Pending(pending));
        }

        let url = location(&response, "members")?;
        Ok(SubscriptionResult::Subscribed(Member::new(
            Arc::clone(self.connection()),
            url,
            None,
        )))
    }

    /// Unsubscribes `email` from the list.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotAMember`] when the server refuses, or the
    /// transport error.
    pub async fn unsubscribe(&mut self, email: &str) -> Result<(), ResourceError> {
        let path = self.member_path(email).await?;
        let result = self
            .connection()
            .call(&path, None, Some(HttpMethod::Delete))
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(HttpError::Response(_)) => Err(self.not_a_member(email).await),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the list's ban list.
    ///
    /// # Errors
    ///
    /// Returns the fetch error for the list's id.
    pub async fn bans(&mut self) -> Result<Bans, ResourceError> {
        let path = self.bans_path().await?;
        Ok(Bans::new(Arc::clone(self.connection()), path, None))
    }

    /// Returns one page of the list's bans.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn get_bans_page(
        &mut self,
        count: u32,
        page: u32,
    ) -> Result<Page<BannedAddress>, ResourceError> {
        let path = self.bans_path().await?;
        Page::fetch(Arc::clone(self.connection()), path, count, page).await
    }

    /// Returns the list's header-match rules.
    ///
    /// # Errors
    ///
    /// Returns the fetch error for the list's id.
    pub async fn header_matches(&mut self) -> Result<HeaderMatches, ResourceError> {
        let path = build_path(
            "lists/{list_id}/header-matches",
            &[("list_id", self.list_id().await?)],
        );
        Ok(HeaderMatches::new(Arc::clone(self.connection()), path, None))
    }

    async fn roster_path(&mut self) -> Result<String, ResourceError> {
        Ok(build_path(
            "lists/{fqdn_listname}/roster/member",
            &[("fqdn_listname", self.fqdn_listname().await?)],
        ))
    }

    async fn held_path(&mut self) -> Result<String, ResourceError> {
        Ok(build_path(
            "lists/{fqdn_listname}/held",
            &[("fqdn_listname", self.fqdn_listname().await?)],
        ))
    }

    async fn bans_path(&mut self) -> Result<String, ResourceError> {
        Ok(build_path(
            "lists/{list_id}/bans",
            &[("list_id", self.list_id().await?)],
        ))
    }

    async fn member_path(&mut self, email: &str) -> Result<String, ResourceError> {
        Ok(build_path(
            "lists/{list_id}/member/{email}",
            &[("list_id", self.list_id().await?.as_str()), ("email", email)],
        ))
    }

    async fn not_a_member(&mut self, email: &str) -> ResourceError {
        let list = match self.fqdn_listname().await {
            Ok(name) => name,
            Err(e) => return e,
        };
        ResourceError::NotAMember {
            address: email.to_string(),
            list,
        }
    }
}

fn sorted_by_address(entries: &[Value]) -> Vec<Value> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| {
        let key = |entry: &Value| {
            entry
                .get("address")
                .and_then(Value::as_str)
                .map(ToString::to_string)
        };
        key(a).cmp(&key(b))
    });
    sorted
}

fn pairs_of(form: &FormData) -> Vec<(&str, &str)> {
    form.pairs()
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_fields_deserialize() {
        let fields: MailingListFields = serde_json::from_value(json!({
            "display_name": "Ant",
            "fqdn_listname": "ant@example.com",
            "list_id": "ant.example.com",
            "list_name": "ant",
            "mail_host": "example.com",
            "member_count": 3,
            "volume": 1,
            "self_link": "http://localhost:8001/3.0/lists/ant.example.com"
        }))
        .unwrap();
        assert_eq!(fields.list_id, "ant.example.com");
        assert_eq!(fields.member_count, 3);
    }

    #[test]
    fn test_list_properties_are_writable_except_self_link() {
        assert!(MailingListKind::check_writable("display_name").is_ok());
        assert!(MailingListKind::check_writable("self_link").is_err());
        assert!(!MailingListKind::is_visible("description"));
    }

    #[test]
    fn test_archivers_autosave() {
        assert!(<ListArchiversKind as ResourceKind>::AUTOSAVE);
    }

    #[test]
    fn test_subscription_request_reads_when() {
        let request: SubscriptionRequest = serde_json::from_value(json!({
            "email": "anne@example.com",
            "token": "0123456789abcdef",
            "token_owner": "moderator",
            "list_id": "ant.example.com",
            "when": "2005-08-01T07:49:23"
        }))
        .unwrap();
        assert_eq!(request.token_owner, "moderator");
        assert_eq!(request.request_date.to_string(), "2005-08-01 07:49:23");
    }

    #[test]
    fn test_sorted_by_address() {
        let sorted = sorted_by_address(&[
            json!({"address": "http://x/addresses/cris@example.com"}),
            json!({"address": "http://x/addresses/anne@example.com"}),
        ]);
        assert_eq!(
            sorted[0]["address"],
            json!("http://x/addresses/anne@example.com")
        );
    }

    #[test]
    fn test_subscription_result_helpers() {
        let pending = SubscriptionResult::Pending(PendingSubscription {
            token: "abc".to_string(),
            token_owner: "subscriber".to_string(),
        });
        assert!(pending.is_pending());
        assert!(pending.member().is_none());
    }
}
