//! Uniform pagination over local sequences and server-side pages.
//!
//! A [`Paginator`] splits either an in-memory `Vec` or a server collection
//! (through a `get_*_page` style function) into numbered pages. The
//! [`paginate`] helper adds the lenient parsing used by web front ends and
//! computes a page range with ellipses for long collections.
//!
//! # Example
//!
//! ```rust,ignore
//! use mailman_client::paginator::{paginate, PageSource};
//!
//! let client = client.clone();
//! let source = PageSource::remote(move |count, page| {
//!     let client = client.clone();
//!     async move { client.get_member_page(count, page).await }
//! });
//! let pagination = paginate(source, Some("3"), Some("25"), 10).await?;
//! for member in pagination.page.items() {
//!     // ...
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::rest::{Page, ResourceError};

/// Page size used by [`paginate`] when none (or an invalid one) is given.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Number of page links [`paginate`] shows before switching to ellipses.
pub const DEFAULT_MAX_PAGE_RANGE: u32 = 10;

type PageFuture<T> = Pin<Box<dyn Future<Output = Result<Page<T>, ResourceError>> + Send>>;
type PageFetcher<T> = Box<dyn Fn(u32, u32) -> PageFuture<T> + Send + Sync>;

/// Errors returned by [`Paginator::page`].
#[derive(Debug, Error)]
pub enum PaginationError {
    /// The requested page is outside `1..=num_pages`.
    #[error("Page {number} is out of range (1..={num_pages})")]
    EmptyPage {
        /// The requested page number.
        number: i64,
        /// The number of pages available.
        num_pages: u32,
    },

    /// Fetching a page from the server failed.
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// Where a [`Paginator`] takes its items from.
pub enum PageSource<T> {
    /// An in-memory sequence.
    Local(Vec<T>),
    /// A function fetching page `page` of `count` items from the server.
    Remote(PageFetcher<T>),
}

impl<T> PageSource<T> {
    /// Wraps a page-fetching function, typically one of the `get_*_page`
    /// methods of [`Client`](crate::Client) or a resource.
    pub fn remote<F, Fut>(fetch: F) -> Self
    where
        T: 'static,
        F: Fn(u32, u32) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Page<T>, ResourceError>> + Send + 'static,
    {
        Self::Remote(Box::new(move |count, page| -> PageFuture<T> {
            Box::pin(fetch(count, page))
        }))
    }
}

impl<T> fmt::Debug for PageSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(items) => f.debug_tuple("Local").field(&items.len()).finish(),
            Self::Remote(_) => f.write_str("Remote"),
        }
    }
}

/// One numbered page of a [`Paginator`].
#[derive(Debug, Clone)]
pub struct PaginatedPage<T> {
    items: Vec<T>,
    number: u32,
    num_pages: u32,
    per_page: u32,
    count: u64,
}

impl<T> PaginatedPage<T> {
    /// Returns the items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consumes the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Returns the 1-based page number.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Returns the number of pages of the paginator.
    #[must_use]
    pub const fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Returns `true` if a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    /// Returns `true` if an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Returns the number of the next page, if any.
    #[must_use]
    pub const fn next_page_number(&self) -> Option<u32> {
        if self.has_next() {
            Some(self.number + 1)
        } else {
            None
        }
    }

    /// Returns the number of the previous page, if any.
    #[must_use]
    pub const fn previous_page_number(&self) -> Option<u32> {
        if self.has_previous() {
            Some(self.number - 1)
        } else {
            None
        }
    }

    /// Returns the 1-based index of the first item, 0 for an empty
    /// collection.
    #[must_use]
    pub const fn start_index(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.per_page as u64 * (self.number as u64 - 1) + 1
        }
    }

    /// Returns the 1-based index of the last item.
    #[must_use]
    pub const fn end_index(&self) -> u64 {
        if self.number == self.num_pages {
            self.count
        } else {
            self.number as u64 * self.per_page as u64
        }
    }
}

/// Splits a [`PageSource`] into pages of `per_page` items.
///
/// For remote sources the total is requested once (`count=0&page=1`) and
/// kept for the paginator's lifetime.
#[derive(Debug)]
pub struct Paginator<T> {
    source: PageSource<T>,
    per_page: u32,
    count: Option<u64>,
}

impl<T: Clone> Paginator<T> {
    /// Creates a paginator. A `per_page` of 0 is treated as 1.
    #[must_use]
    pub fn new(source: PageSource<T>, per_page: u32) -> Self {
        Self {
            source,
            per_page: per_page.max(1),
            count: None,
        }
    }

    /// Returns the page size.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Returns the total number of items.
    ///
    /// # Errors
    ///
    /// Returns the fetch error of a remote source.
    pub async fn count(&mut self) -> Result<u64, ResourceError> {
        if let Some(count) = self.count {
            return Ok(count);
        }
        let count = match &self.source {
            PageSource::Local(items) => items.len() as u64,
            PageSource::Remote(fetch) => fetch(0, 1).await?.total_size(),
        };
        self.count = Some(count);
        Ok(count)
    }

    /// Returns the number of pages; an empty collection has one.
    ///
    /// # Errors
    ///
    /// Returns the fetch error of a remote source.
    pub async fn num_pages(&mut self) -> Result<u32, ResourceError> {
        let count = self.count().await?;
        let pages = count.div_ceil(u64::from(self.per_page)).max(1);
        Ok(u32::try_from(pages).unwrap_or(u32::MAX))
    }

    /// Returns page `number` (1-based).
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::EmptyPage`] if `number` is outside
    /// `1..=num_pages`, or the fetch error.
    pub async fn page(&mut self, number: i64) -> Result<PaginatedPage<T>, PaginationError> {
        let num_pages = self.num_pages().await?;
        let page = match u32::try_from(number) {
            Ok(page) if (1..=num_pages).contains(&page) => page,
            _ => return Err(PaginationError::EmptyPage { number, num_pages }),
        };

        let items = match &self.source {
            PageSource::Local(items) => {
                let start = (page as usize - 1).saturating_mul(self.per_page as usize);
                let end = start.saturating_add(self.per_page as usize).min(items.len());
                items.get(start..end).map(<[T]>::to_vec).unwrap_or_default()
            }
            PageSource::Remote(fetch) => fetch(self.per_page, page).await?.into_entries(),
        };

        Ok(PaginatedPage {
            items,
            number: page,
            num_pages,
            per_page: self.per_page,
            count: self.count().await?,
        })
    }
}

/// One element of a displayed page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    /// A link to a page.
    Number(u32),
    /// Elided pages.
    Ellipsis,
}

impl fmt::Display for PageLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Ellipsis => f.write_str("..."),
        }
    }
}

/// Result of [`paginate`].
#[derive(Debug, Clone)]
pub struct Pagination<T> {
    /// The page delivered.
    pub page: PaginatedPage<T>,
    /// Page links to display around it.
    pub page_range: Vec<PageLink>,
}

/// Paginates `source` leniently.
///
/// `page_num` and `per_page` are parsed from request parameters:
/// unparsable values fall back to page 1 and [`DEFAULT_PER_PAGE`] items,
/// and a page past either end delivers the last page. When there are more
/// than `max_page_range` pages the range keeps the first and last page and
/// the pages near the current one, with [`PageLink::Ellipsis`] for gaps.
///
/// # Errors
///
/// Returns the fetch error of a remote source.
pub async fn paginate<T: Clone>(
    source: PageSource<T>,
    page_num: Option<&str>,
    per_page: Option<&str>,
    max_page_range: u32,
) -> Result<Pagination<T>, PaginationError> {
    let requested = page_num
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(1);
    let per_page = per_page
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|per_page| *per_page > 0)
        .unwrap_or(DEFAULT_PER_PAGE);

    let mut paginator = Paginator::new(source, per_page);
    let result = paginator.page(requested).await;
    let page = match result {
        Ok(page) => page,
        Err(PaginationError::EmptyPage { num_pages, .. }) => {
            paginator.page(i64::from(num_pages)).await?
        }
        Err(e) => return Err(e),
    };

    let page_range = page_range(page.number(), page.num_pages(), max_page_range);
    Ok(Pagination { page, page_range })
}

/// Computes the displayed page links for page `current` of `num_pages`.
#[must_use]
pub fn page_range(current: u32, num_pages: u32, max_page_range: u32) -> Vec<PageLink> {
    if num_pages <= max_page_range {
        return (1..=num_pages).map(PageLink::Number).collect();
    }

    let current = i64::from(current);
    let last = i64::from(num_pages);
    let spread = neighbour_spread(max_page_range);
    let mut links = vec![PageLink::Number(1)];

    let mut lower = current - spread;
    if lower > 3 {
        links.push(PageLink::Ellipsis);
    } else {
        lower = 2;
    }
    links.extend((lower..current).filter_map(to_link));
    if current != 1 && current != last {
        links.extend(to_link(current));
    }

    let mut upper = current + spread;
    if upper >= last - 2 {
        upper = last - 1;
    }
    links.extend((current + 1..=upper).filter_map(to_link));
    if upper < last - 2 {
        links.push(PageLink::Ellipsis);
    }
    links.push(PageLink::Number(num_pages));
    links
}

/// Pages shown on each side of the current one: `max / 2 - 2`, truncated
/// toward zero.
fn neighbour_spread(max_page_range: u32) -> i64 {
    let half = i64::from(max_page_range / 2);
    if max_page_range % 2 == 1 && half < 2 {
        half - 1
    } else {
        half - 2
    }
}

fn to_link(number: i64) -> Option<PageLink> {
    u32::try_from(number).ok().map(PageLink::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageLink::{Ellipsis, Number};

    fn numbers(range: &[u32]) -> Vec<PageLink> {
        range.iter().copied().map(Number).collect()
    }

    #[test]
    fn test_short_range_lists_every_page() {
        assert_eq!(page_range(2, 5, 10), numbers(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_range_near_start() {
        assert_eq!(
            page_range(1, 20, 10),
            vec![Number(1), Number(2), Number(3), Number(4), Ellipsis, Number(20)]
        );
    }

    #[test]
    fn test_range_in_the_middle() {
        assert_eq!(
            page_range(10, 20, 10),
            vec![
                Number(1),
                Ellipsis,
                Number(7),
                Number(8),
                Number(9),
                Number(10),
                Number(11),
                Number(12),
                Number(13),
                Ellipsis,
                Number(20)
            ]
        );
    }

    #[test]
    fn test_range_near_end() {
        assert_eq!(
            page_range(19, 20, 10),
            vec![
                Number(1),
                Ellipsis,
                Number(16),
                Number(17),
                Number(18),
                Number(19),
                Number(20)
            ]
        );
    }

    #[test]
    fn test_spread_truncates_toward_zero() {
        assert_eq!(neighbour_spread(10), 3);
        assert_eq!(neighbour_spread(7), 1);
        assert_eq!(neighbour_spread(3), 0);
        assert_eq!(neighbour_spread(1), -1);
    }

    #[tokio::test]
    async fn test_local_pages() {
        let mut paginator = Paginator::new(PageSource::Local((1..=25).collect()), 10);
        assert_eq!(paginator.num_pages().await.unwrap(), 3);

        let last = paginator.page(3).await.unwrap();
        assert_eq!(last.items(), &[21, 22, 23, 24, 25]);
        assert_eq!((last.start_index(), last.end_index()), (21, 25));
        assert!(!last.has_next());
        assert_eq!(last.previous_page_number(), Some(2));

        assert!(matches!(
            paginator.page(4).await,
            Err(PaginationError::EmptyPage { number: 4, num_pages: 3 })
        ));
        assert!(matches!(
            paginator.page(0).await,
            Err(PaginationError::EmptyPage { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_collection_has_a_first_page() {
        let mut paginator: Paginator<u8> = Paginator::new(PageSource::Local(Vec::new()), 10);
        let page = paginator.page(1).await.unwrap();
        assert!(page.items().is_empty());
        assert_eq!(page.num_pages(), 1);
        assert_eq!(page.start_index(), 0);
    }

    #[tokio::test]
    async fn test_paginate_is_lenient() {
        let source = PageSource::Local((1..=45).collect::<Vec<u32>>());
        let pagination = paginate(source, Some("abc"), Some("-5"), 10).await.unwrap();
        assert_eq!(pagination.page.number(), 1);
        assert_eq!(pagination.page.items().len(), DEFAULT_PER_PAGE as usize);

        let source = PageSource::Local((1..=45).collect::<Vec<u32>>());
        let pagination = paginate(source, Some("9999"), Some("20"), 10).await.unwrap();
        assert_eq!(pagination.page.number(), 3);
        assert_eq!(pagination.page.items(), &[41, 42, 43, 44, 45]);
        assert_eq!(pagination.page_range, numbers(&[1, 2, 3]));
    }
}
