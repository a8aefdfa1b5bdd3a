//! Responsive, circular paging over a rail's items

use std::ops::Range;

/// Only this many pages' worth of items are ever shown
pub const MAX_PAGES: usize = 5;

/// Pages rendered with content before the current page
const WINDOW_PAGES_BEFORE: usize = 1;

/// Pages rendered with content from the current page onwards
const WINDOW_PAGES_AFTER: usize = 2;

/// Items per page for a viewport width in pixels
pub fn items_per_page(viewport_width: u32) -> usize {
    match viewport_width {
        0..=399 => 1,
        400..=599 => 1,
        600..=1199 => 2,
        1200..=1499 => 4,
        1500..=1999 => 5,
        2000..=2999 => 6,
        3000..=3999 => 7,
        4000..=4999 => 8,
        _ => 6,
    }
}

/// Number of items actually considered for display
pub fn displayed_count(item_count: usize, per_page: usize) -> usize {
    item_count.min(per_page * MAX_PAGES)
}

/// `ceil(displayed / per_page)`
pub fn page_count(item_count: usize, per_page: usize) -> usize {
    displayed_count(item_count, per_page).div_ceil(per_page)
}

/// Item indices rendered with content: one page before the current page
/// through two pages from it, bounded by the displayed items.
pub fn visible_window(current_page: usize, per_page: usize, displayed: usize) -> Range<usize> {
    let page_start = current_page * per_page;
    let start = page_start.saturating_sub(WINDOW_PAGES_BEFORE * per_page);
    let end = (page_start + WINDOW_PAGES_AFTER * per_page).min(displayed);
    start.min(end)..end
}

/// Current page plus the viewport-derived page size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    current_page: usize,
    items_per_page: usize,
}

impl Pager {
    pub fn new(viewport_width: u32) -> Self {
        Self {
            current_page: 0,
            items_per_page: items_per_page(viewport_width),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn page_count(&self, item_count: usize) -> usize {
        page_count(item_count, self.items_per_page)
    }

    pub fn displayed_count(&self, item_count: usize) -> usize {
        displayed_count(item_count, self.items_per_page)
    }

    /// Pagination controls only make sense with more than one page of items
    pub fn controls_visible(&self, item_count: usize) -> bool {
        self.displayed_count(item_count) > self.items_per_page
    }

    pub fn visible_window(&self, item_count: usize) -> Range<usize> {
        visible_window(
            self.current_page,
            self.items_per_page,
            self.displayed_count(item_count),
        )
    }

    /// Next page, wrapping from the last page to the first
    pub fn advance(&mut self, item_count: usize) {
        let pages = self.page_count(item_count);
        self.current_page = match pages {
            0 => 0,
            _ => (self.current_page + 1) % pages,
        };
    }

    /// Previous page, wrapping from the first page to the last
    pub fn retreat(&mut self, item_count: usize) {
        let pages = self.page_count(item_count);
        self.current_page = match (pages, self.current_page) {
            (0, _) => 0,
            (_, 0) => pages - 1,
            (_, current) => current - 1,
        };
    }

    /// Jump to `page`, wrapped into range
    pub fn jump_to(&mut self, page: usize, item_count: usize) {
        let pages = self.page_count(item_count);
        self.current_page = if pages == 0 { 0 } else { page % pages };
    }

    /// Recompute the page size for a new viewport width
    pub fn resize(&mut self, viewport_width: u32, item_count: usize) {
        self.items_per_page = items_per_page(viewport_width);
        self.clamp(item_count);
    }

    /// Keep the current page valid after the item count changed
    pub fn clamp(&mut self, item_count: usize) {
        let pages = self.page_count(item_count);
        self.current_page = self.current_page.min(pages.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoints() {
        assert_eq!(items_per_page(0), 1);
        assert_eq!(items_per_page(399), 1);
        assert_eq!(items_per_page(400), 1);
        assert_eq!(items_per_page(599), 1);
        assert_eq!(items_per_page(600), 2);
        assert_eq!(items_per_page(1199), 2);
        assert_eq!(items_per_page(1200), 4);
        assert_eq!(items_per_page(1499), 4);
        assert_eq!(items_per_page(1500), 5);
        assert_eq!(items_per_page(1600), 5);
        assert_eq!(items_per_page(1999), 5);
        assert_eq!(items_per_page(2000), 6);
        assert_eq!(items_per_page(3999), 7);
        assert_eq!(items_per_page(4999), 8);
        assert_eq!(items_per_page(5000), 6);
        assert_eq!(items_per_page(u32::MAX), 6);
    }

    #[test]
    fn test_page_count_caps_at_five_pages() {
        // width 1600 -> 5 per page, 37 items -> 25 displayed -> 5 pages
        let per_page = items_per_page(1600);
        assert_eq!(displayed_count(37, per_page), 25);
        assert_eq!(page_count(37, per_page), 5);
    }

    #[test]
    fn test_page_count_rounds_up() {
        assert_eq!(page_count(0, 4), 0);
        assert_eq!(page_count(1, 4), 1);
        assert_eq!(page_count(4, 4), 1);
        assert_eq!(page_count(5, 4), 2);
        assert_eq!(page_count(9, 4), 3);
    }

    #[test]
    fn test_advance_wraps_to_first_page() {
        let mut pager = Pager::new(1600);
        pager.jump_to(4, 37);
        assert_eq!(pager.current_page(), 4);
        pager.advance(37);
        assert_eq!(pager.current_page(), 0);
    }

    #[test]
    fn test_retreat_wraps_to_last_page() {
        let mut pager = Pager::new(1600);
        pager.retreat(37);
        assert_eq!(pager.current_page(), 4);
        pager.retreat(37);
        assert_eq!(pager.current_page(), 3);
    }

    #[test]
    fn test_jump_wraps() {
        let mut pager = Pager::new(1600);
        pager.jump_to(7, 37);
        assert_eq!(pager.current_page(), 2);
    }

    #[test]
    fn test_navigation_without_items_stays_at_zero() {
        let mut pager = Pager::new(1600);
        pager.advance(0);
        assert_eq!(pager.current_page(), 0);
        pager.retreat(0);
        assert_eq!(pager.current_page(), 0);
        pager.jump_to(3, 0);
        assert_eq!(pager.current_page(), 0);
        assert_eq!(pager.page_count(0), 0);
        assert!(!pager.controls_visible(0));
    }

    #[test]
    fn test_controls_hidden_for_single_page() {
        let pager = Pager::new(1600);
        assert!(!pager.controls_visible(5));
        assert!(pager.controls_visible(6));
    }

    #[test]
    fn test_visible_window() {
        // page 0: pages 0..2
        assert_eq!(visible_window(0, 5, 25), 0..10);
        // page 2: pages 1..4
        assert_eq!(visible_window(2, 5, 25), 5..20);
        // last page: clipped at displayed
        assert_eq!(visible_window(4, 5, 25), 15..25);
        // short list
        assert_eq!(visible_window(0, 5, 3), 0..3);
        assert_eq!(visible_window(0, 5, 0), 0..0);
    }

    #[test]
    fn test_resize_clamps_current_page() {
        let mut pager = Pager::new(700);
        pager.jump_to(4, 10);
        assert_eq!(pager.current_page(), 4);

        pager.resize(1600, 10);
        assert_eq!(pager.items_per_page(), 5);
        assert_eq!(pager.current_page(), 1);
    }
}
