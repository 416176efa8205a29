//! Page arithmetic over the file snapshot.
//!
//! Everything here is pure: [`view`] slices a snapshot for a given page and
//! [`PaginationState`] holds the cursor and enforces
//! `1 <= current_page <= total_pages` on every transition.

use std::ops::RangeInclusive;

use crate::error::ClientError;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// Maximum number of page buttons shown at once
pub const PAGE_WINDOW: usize = 5;

/// `max(1, ceil(len / items_per_page))`
pub fn total_pages(len: usize, items_per_page: usize) -> usize {
    if items_per_page == 0 {
        return 1;
    }
    len.div_ceil(items_per_page).max(1)
}

/// Page numbers to render as buttons.
///
/// All pages when there are at most [`PAGE_WINDOW`] of them, otherwise a
/// window centered on `current_page` that never leaves `1..=total_pages`.
pub fn page_window(current_page: usize, total_pages: usize) -> RangeInclusive<usize> {
    let total_pages = total_pages.max(1);
    if total_pages <= PAGE_WINDOW {
        return 1..=total_pages;
    }

    let half = PAGE_WINDOW / 2;
    if current_page <= half + 1 {
        1..=PAGE_WINDOW
    } else if current_page + half >= total_pages {
        (total_pages + 1 - PAGE_WINDOW)..=total_pages
    } else {
        (current_page - half)..=(current_page + half)
    }
}

/// One page of a snapshot plus the numbers needed to render its controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView<'a, T> {
    pub items: &'a [T],
    pub start_index: usize,
    pub end_index: usize,
    pub total_items: usize,
    pub current_page: usize,
    pub total_pages: usize,
}

impl<T> PageView<'_, T> {
    pub fn can_go_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn window(&self) -> RangeInclusive<usize> {
        page_window(self.current_page, self.total_pages)
    }

    /// "Showing 21 to 23 of 23", or "Showing 0 to 0 of 0" for an empty page
    pub fn summary(&self) -> String {
        if self.items.is_empty() {
            return "Showing 0 to 0 of 0".to_string();
        }
        format!(
            "Showing {} to {} of {}",
            self.start_index + 1,
            self.end_index,
            self.total_items
        )
    }
}

/// Slice `snapshot` for `current_page` (1-based).
pub fn view<T>(snapshot: &[T], current_page: usize, items_per_page: usize) -> PageView<'_, T> {
    let items_per_page = items_per_page.max(1);
    let current_page = current_page.max(1);
    let start_index = ((current_page - 1) * items_per_page).min(snapshot.len());
    let end_index = (start_index + items_per_page).min(snapshot.len());

    PageView {
        items: &snapshot[start_index..end_index],
        start_index,
        end_index,
        total_items: snapshot.len(),
        current_page,
        total_pages: total_pages(snapshot.len(), items_per_page),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    current_page: usize,
    items_per_page: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            current_page: 1,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

impl PaginationState {
    pub fn new(items_per_page: usize) -> Result<Self, ClientError> {
        let mut state = Self::default();
        state.set_items_per_page(items_per_page)?;
        Ok(state)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn total_pages(&self, len: usize) -> usize {
        total_pages(len, self.items_per_page)
    }

    pub fn view<'a, T>(&self, snapshot: &'a [T]) -> PageView<'a, T> {
        view(snapshot, self.current_page, self.items_per_page)
    }

    /// Jump to page `page`. Out-of-range requests leave the state unchanged.
    ///
    /// Returns `true` when the request was in range.
    pub fn go_to_page(&mut self, page: usize, len: usize) -> bool {
        if page < 1 || page > self.total_pages(len) {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn next_page(&mut self, len: usize) -> bool {
        self.go_to_page(self.current_page + 1, len)
    }

    pub fn prev_page(&mut self, len: usize) -> bool {
        match self.current_page.checked_sub(1) {
            Some(page) => self.go_to_page(page, len),
            None => false,
        }
    }

    /// Change the page size; always lands on page 1.
    pub fn set_items_per_page(&mut self, items_per_page: usize) -> Result<(), ClientError> {
        if items_per_page == 0 {
            return Err(ClientError::validation(
                "Items per page must be greater than zero.",
            ));
        }
        self.items_per_page = items_per_page;
        self.current_page = 1;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }
}
