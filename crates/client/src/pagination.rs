//! Deduplicating pagination.
//!
//! Pages are appended to one growing list; an item whose id is already in
//! the list is dropped. Loads are ticketed: [`Paginator::begin`] hands out a
//! [`PageTicket`] and only a ticket from the current generation can complete.
//! A reset bumps the generation, so a page requested before the reset is
//! ignored when it lands.

use std::collections::HashSet;

use souk_core::Identified;

/// Permission to load one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    page: u32,
    generation: u64,
}

impl PageTicket {
    /// The 1-based page to request.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }
}

/// Result of a "load more" request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageResult {
    /// The next page arrived; this many new items were appended.
    Appended(usize),
    /// Another load is still running.
    Busy,
    /// The server reported no further pages.
    Exhausted,
    /// The view closed or the list was reset while loading.
    Cancelled,
}

/// A list assembled from pages.
#[derive(Debug, Clone)]
pub struct Paginator<T: Identified> {
    items: Vec<T>,
    seen: HashSet<T::Id>,
    page: u32,
    total_pages: u32,
    has_more: bool,
    loading: bool,
    generation: u64,
    page_size: usize,
}

impl<T: Identified> Paginator<T> {
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            page: 0,
            total_pages: 0,
            has_more: true,
            loading: false,
            generation: 0,
            page_size: usize::try_from(page_size).unwrap_or(usize::MAX),
        }
    }

    /// Start loading the next page.
    ///
    /// Returns `None` while a load is already in progress or when the server
    /// reported no further pages.
    pub fn begin(&mut self) -> Option<PageTicket> {
        if self.loading || !self.has_more {
            return None;
        }
        self.loading = true;
        Some(PageTicket {
            page: self.page + 1,
            generation: self.generation,
        })
    }

    /// Start loading page 1 in a new generation.
    ///
    /// Shown items stay until page 1 arrives, so a failed reload leaves the
    /// list as it was. Call [`Paginator::reset`] first to clear it.
    pub fn restart(&mut self) -> PageTicket {
        self.generation += 1;
        self.loading = true;
        PageTicket {
            page: 1,
            generation: self.generation,
        }
    }

    /// Whether `ticket` still belongs to the current generation.
    #[must_use]
    pub const fn is_current(&self, ticket: PageTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Apply a fetched page.
    ///
    /// At most `page_size` items are taken from `incoming`, and items already
    /// present are dropped. Page 1 replaces the list. Returns the number of
    /// items appended, or `None` if the ticket is from an earlier generation.
    pub fn complete(
        &mut self,
        ticket: PageTicket,
        incoming: Vec<T>,
        total_pages: u32,
    ) -> Option<usize> {
        let appended = self.apply(ticket, incoming, total_pages)?;
        self.loading = false;
        Some(appended)
    }

    /// Show page 1 provisionally without ending the load, e.g. from cache.
    ///
    /// Returns false if the ticket is from an earlier generation.
    pub fn preview(&mut self, ticket: PageTicket, incoming: Vec<T>, total_pages: u32) -> bool {
        ticket.page == 1 && self.apply(ticket, incoming, total_pages).is_some()
    }

    /// Abandon a load after a failure. The list is left as it was.
    pub fn fail(&mut self, ticket: PageTicket) {
        if self.is_current(ticket) {
            self.loading = false;
        }
    }

    /// Back to the starting state; the next load is page 1.
    pub fn reset(&mut self) {
        self.items.clear();
        self.seen.clear();
        self.page = 0;
        self.total_pages = 0;
        self.has_more = true;
        self.loading = false;
        self.generation += 1;
    }

    fn apply(&mut self, ticket: PageTicket, incoming: Vec<T>, total_pages: u32) -> Option<usize> {
        if !self.is_current(ticket) {
            return None;
        }
        if ticket.page == 1 {
            self.items.clear();
            self.seen.clear();
        }

        let before = self.items.len();
        for item in incoming.into_iter().take(self.page_size) {
            if self.seen.insert(item.id().clone()) {
                self.items.push(item);
            }
        }

        self.page = ticket.page;
        self.total_pages = total_pages;
        self.has_more = self.page < total_pages;
        Some(self.items.len() - before)
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Last page applied, 0 before the first.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item(u32);

    impl Identified for Item {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.0
        }
    }

    fn items(ids: &[u32]) -> Vec<Item> {
        ids.iter().copied().map(Item).collect()
    }

    fn ids(paginator: &Paginator<Item>) -> Vec<u32> {
        paginator.items().iter().map(|i| i.0).collect()
    }

    #[test]
    fn test_duplicates_across_pages_appear_once() {
        let mut paginator = Paginator::new(4);
        let pages = [
            items(&[1, 2, 3, 4]),
            items(&[3, 4, 5, 6]),
            items(&[6, 7, 1, 8]),
        ];

        for page in pages {
            let ticket = paginator.begin().unwrap();
            paginator.complete(ticket, page, 5).unwrap();
        }

        assert_eq!(ids(&paginator), [1, 2, 3, 4, 5, 6, 7, 8]);
        let unique: HashSet<_> = ids(&paginator).into_iter().collect();
        assert_eq!(unique.len(), paginator.len());
        assert_eq!(paginator.page(), 3);
        assert!(paginator.has_more());
    }

    #[test]
    fn test_oversized_page_truncated() {
        let mut paginator = Paginator::new(10);
        let ticket = paginator.begin().unwrap();
        let appended = paginator
            .complete(ticket, items(&(1..=15).collect::<Vec<_>>()), 3)
            .unwrap();

        assert_eq!(appended, 10);
        assert_eq!(paginator.len(), 10);
        assert!(paginator.has_more());
    }

    #[test]
    fn test_no_reentry_while_loading() {
        let mut paginator = Paginator::<Item>::new(10);
        let ticket = paginator.begin().unwrap();
        assert!(paginator.begin().is_none());

        paginator.fail(ticket);
        assert!(!paginator.is_loading());
        assert_eq!(paginator.begin().map(PageTicket::page), Some(1));
    }

    #[test]
    fn test_exhausted_after_last_page() {
        let mut paginator = Paginator::new(2);
        let ticket = paginator.begin().unwrap();
        paginator.complete(ticket, items(&[1, 2]), 1);

        assert!(!paginator.has_more());
        assert!(paginator.begin().is_none());
    }

    #[test]
    fn test_reset_ignores_inflight_page() {
        let mut paginator = Paginator::new(2);
        let first = paginator.begin().unwrap();
        paginator.complete(first, items(&[1, 2]), 3);

        let stale = paginator.begin().unwrap();
        paginator.reset();
        assert_eq!(paginator.complete(stale, items(&[3, 4]), 3), None);
        assert!(paginator.is_empty());

        let ticket = paginator.begin().unwrap();
        assert_eq!(ticket.page(), 1);
    }

    #[test]
    fn test_preview_then_complete_replaces_first_page() {
        let mut paginator = Paginator::new(5);
        let ticket = paginator.restart();

        assert!(paginator.preview(ticket, items(&[9, 8]), 2));
        assert!(paginator.is_loading());
        assert_eq!(ids(&paginator), [9, 8]);

        paginator.complete(ticket, items(&[1, 2, 3]), 2);
        assert_eq!(ids(&paginator), [1, 2, 3]);
        assert!(!paginator.is_loading());
    }

    #[test]
    fn test_restart_keeps_items_until_first_page_lands() {
        let mut paginator = Paginator::new(2);
        let first = paginator.begin().unwrap();
        paginator.complete(first, items(&[1, 2]), 3);
        let second = paginator.begin().unwrap();
        paginator.complete(second, items(&[3, 4]), 3);

        let ticket = paginator.restart();
        assert_eq!(ticket.page(), 1);
        assert_eq!(ids(&paginator), [1, 2, 3, 4]);
        assert!(paginator.begin().is_none());

        paginator.fail(ticket);
        assert_eq!(ids(&paginator), [1, 2, 3, 4]);
        assert_eq!(paginator.page(), 2);

        let ticket = paginator.restart();
        paginator.complete(ticket, items(&[2, 5]), 3);
        assert_eq!(ids(&paginator), [2, 5]);
        assert_eq!(paginator.page(), 1);
    }
}
