//! One page of a server-paginated collection.
//!
//! This module provides [`Page<T>`], which fetches a single page of a
//! collection eagerly and materializes its entries as `T` resources.
//! `Page<T>` implements `Deref<Target = [T]>`, so it can be indexed,
//! iterated and measured like a slice.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut page = client.get_list_page(25, 1, false).await?;
//! loop {
//!     for list in page.iter() {
//!         println!("{}", list.url());
//!     }
//!     if !page.has_next() {
//!         break;
//!     }
//!     page = page.next().await?;
//! }
//! ```

use std::ops::Deref;
use std::sync::Arc;

use serde_json::Value;

use crate::clients::Connection;
use crate::rest::{with_query, Resource, ResourceError};

/// Page size used when the caller does not choose one.
pub const DEFAULT_PAGE_ITEM_COUNT: u32 = 50;

/// A page of `T` resources.
///
/// The page remembers the path, size and number it was fetched with, so
/// [`next`](Self::next) and [`previous`](Self::previous) can fetch the
/// neighbouring pages.
#[derive(Debug, Clone)]
pub struct Page<T> {
    connection: Arc<Connection>,
    path: String,
    count: u32,
    page: u32,
    total_size: u64,
    entries: Vec<T>,
}

impl<T: Resource> Page<T> {
    /// Fetches page `page` (1-based) of `count` entries from `path`.
    ///
    /// `path` may already carry a query string; `count` and `page` replace
    /// any values it holds for those keys.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or [`ResourceError::UnexpectedBody`] if the
    /// body is not a collection.
    pub async fn fetch(
        connection: Arc<Connection>,
        path: impl Into<String>,
        count: u32,
        page: u32,
    ) -> Result<Self, ResourceError> {
        let path = path.into();
        let url = Self::build_url(&path, count, page);
        tracing::debug!("Fetching page {} ({} per page) of {}", page, count, path);

        let response = connection.call(&url, None, None).await?;
        let body = response
            .body_object()
            .ok_or_else(|| ResourceError::UnexpectedBody {
                url: url.clone(),
                expected: "a JSON object",
            })?;
        let total_size = body
            .get("total_size")
            .and_then(Value::as_u64)
            .ok_or_else(|| ResourceError::UnexpectedBody {
                url: url.clone(),
                expected: "a collection with a total_size",
            })?;
        let entries = body
            .get("entries")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| T::from_entry(&connection, entry))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            connection,
            path,
            count,
            page,
            total_size,
            entries,
        })
    }

    /// Fetches the following page.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::PageOutOfRange`] if this is page `u32::MAX`,
    /// or the fetch error.
    pub async fn next(&self) -> Result<Self, ResourceError> {
        let next = self
            .page
            .checked_add(1)
            .ok_or_else(|| ResourceError::PageOutOfRange {
                url: self.url(),
                page: self.page,
            })?;
        Self::fetch(Arc::clone(&self.connection), self.path.clone(), self.count, next).await
    }

    /// Fetches the preceding page, or returns `None` on the first page.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn previous(&self) -> Result<Option<Self>, ResourceError> {
        if !self.has_previous() {
            return Ok(None);
        }
        Self::fetch(
            Arc::clone(&self.connection),
            self.path.clone(),
            self.count,
            self.page - 1,
        )
        .await
        .map(Some)
    }
}

impl<T> Page<T> {
    /// Returns the URL for page `page` of `count` entries from `path`.
    ///
    /// The query string is sorted by key.
    #[must_use]
    pub fn build_url(path: &str, count: u32, page: u32) -> String {
        with_query(
            path,
            &[("count", count.to_string()), ("page", page.to_string())],
        )
    }

    /// Returns the URL this page was fetched from.
    #[must_use]
    pub fn url(&self) -> String {
        Self::build_url(&self.path, self.count, self.page)
    }

    /// Returns the number of entries in the whole collection.
    #[must_use]
    pub const fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Returns the 1-based page number.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.page
    }

    /// Returns the requested page size.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Returns `true` if entries exist past this page.
    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.count) * u64::from(self.page) < self.total_size
    }

    /// Returns `true` unless this is the first page.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Returns the entries of this page.
    #[must_use]
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Takes ownership of the entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<T> {
        self.entries
    }
}

impl<T> Deref for Page<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
