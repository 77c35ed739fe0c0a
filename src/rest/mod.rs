//! REST resource infrastructure for the Mailman API.
//!
//! This module provides the generic machinery every Mailman resource is
//! built on:
//!
//! - **[`ResourceKind`] trait**: per-kind field policy (visible, writable and
//!   read-only fields, autosave) plus the typed `Fields` view
//! - **[`RestBase`]**: lazy snapshot loading and buffered writes
//! - **[`RestObject`], [`RestDict`], [`RestList`]**: object-, mapping- and
//!   sequence-shaped views over `RestBase`
//! - **[`Page<T>`]**: one page of a server-paginated collection
//! - **[`PendingChanges`]**: the buffer of unsaved field writes
//! - **Path building**: template interpolation and query merging
//! - **[`ResourceError`]**: semantic error types for resource operations
//!
//! # Example: Using a Resource
//!
//! ```rust,ignore
//! use mailman_client::{Client, ClientConfig};
//!
//! let client = Client::new(&ClientConfig::from_env()?)?;
//!
//! // Nothing is fetched until a field is read
//! let mut member = client.get_member("ant@example.com", "anne@example.com").await?;
//! println!("{}", member.get("delivery_mode").await?);
//!
//! // Writes are buffered and sent as a single PATCH
//! member.set("delivery_mode", "summary_digests").await?;
//! member.set("moderation_action", "hold").await?;
//! member.save().await?;
//!
//! // Typed access to the whole snapshot
//! let fields = member.fields().await?;
//! println!("{} on {}", fields.email, fields.list_id);
//! ```
//!
//! # Key Types
//!
//! - [`ResourceError`]: error type for resource operations
//! - [`Resource`] and [`ListKind`]: factory and collection contracts
//! - [`resources`]: the Mailman resource kinds (Domain, MailingList, ...)

mod base;
mod dict;
mod errors;
mod list;
mod object;
mod page;
mod path;
mod resource;
mod tracking;

pub mod resources;

pub use base::RestBase;
pub use dict::RestDict;
pub use errors::ResourceError;
pub use list::RestList;
pub use object::RestObject;
pub use page::{Page, DEFAULT_PAGE_ITEM_COUNT};
pub use path::{build_path, with_query};
pub use resource::{ListKind, Resource, ResourceKind};
pub use tracking::PendingChanges;
