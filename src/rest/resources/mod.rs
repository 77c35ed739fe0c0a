//! Mailman REST resource kinds.
//!
//! Every kind is a marker type plugged into one of the generic shapes in
//! [`crate::rest`]: [`RestObject`](crate::rest::RestObject) for single
//! records, [`RestDict`](crate::rest::RestDict) for settings-like mappings
//! and [`RestList`](crate::rest::RestList) for collections. Kind-specific
//! operations are inherent methods on the resulting type aliases.
//!
//! # Available Resources
//!
//! ## Domains and Lists
//!
//! ```rust,ignore
//! use mailman_client::resources::{Domain, MailingList, SubscribeParams};
//!
//! let mut domain = client.get_domain("example.com").await?;
//! let mut list = domain.create_list("ants").await?;
//!
//! let params = SubscribeParams {
//!     pre_verified: true,
//!     pre_confirmed: true,
//!     ..Default::default()
//! };
//! let result = list.subscribe("anne@example.com", params).await?;
//! ```
//!
//! ## Users and Addresses
//!
//! ```rust,ignore
//! use mailman_client::resources::User;
//!
//! let mut user = client.get_user("anne@example.com").await?;
//! let mut address = user.add_address("anne@work.example.com", false).await?;
//! address.verify().await?;
//! ```
//!
//! ## Moderation
//!
//! ```rust,ignore
//! use mailman_client::resources::ModerationDecision;
//!
//! for message in list.held().await? {
//!     message.moderate(ModerationDecision::Discard).await?;
//! }
//! ```

mod address;
mod bans;
mod common;
mod domain;
mod header_match;
mod held_message;
mod mailing_list;
mod member;
mod preferences;
mod queue;
mod settings;
mod user;

pub use address::{Address, AddressFields, AddressKind, Addresses, AddressesKind};
pub use bans::{BannedAddress, BannedAddressFields, BannedAddressKind, Bans, BansKind};
pub use common::{MemberRole, ModerationDecision};
pub use domain::{Domain, DomainFields, DomainKind};
pub use header_match::{
    HeaderMatch, HeaderMatchFields, HeaderMatchKind, HeaderMatches, HeaderMatchesKind,
};
pub use held_message::{HeldMessage, HeldMessageFields, HeldMessageKind};
pub use mailing_list::{
    ListArchivers, ListArchiversKind, MailingList, MailingListFields, MailingListKind,
    PendingSubscription, SubscribeParams, SubscriptionRequest, SubscriptionResult,
};
pub use member::{Member, MemberFields, MemberKind};
pub use preferences::{Preferences, PreferencesFields, PreferencesKind};
pub use queue::{Queue, QueueFields, QueueKind};
pub use settings::{Settings, SettingsKind};
pub use user::{User, UserFields, UserKind};

pub(crate) use common::{entries, from_body, location, materialize};
