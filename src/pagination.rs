//! Page-number window shown under paginated listings.

use serde::Serialize;

pub const DEFAULT_MAX_VISIBLE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Computes the page indicators for `current_page` out of `total_pages`.
///
/// Up to `max_visible` pages are listed outright. Beyond that a window of
/// exactly `max_visible` pages follows the current page, with the first and
/// last page pinned outside it behind an ellipsis. A `max_visible` of zero is
/// treated as one.
pub fn compute_window(current_page: u32, total_pages: u32, max_visible: u32) -> Vec<PageItem> {
    let max_visible = max_visible.max(1);

    if total_pages <= max_visible {
        return (1..=total_pages).map(PageItem::Page).collect();
    }

    let left_side = max_visible / 2;
    let right_side = max_visible - left_side - 1;

    let mut start = current_page.saturating_sub(left_side).max(1);
    let mut end = current_page.saturating_add(right_side).min(total_pages);

    if start == 1 {
        end = max_visible.min(total_pages);
    }
    if end == total_pages {
        start = (total_pages + 1).saturating_sub(max_visible).max(1);
    }

    let mut items = Vec::with_capacity(max_visible as usize + 4);
    if start > 1 {
        items.push(PageItem::Page(1));
        items.push(PageItem::Ellipsis);
    }
    items.extend((start..=end).map(PageItem::Page));
    if end < total_pages {
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(total_pages));
    }
    items
}

/// Everything a view needs to draw page navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationControls {
    pub current: u32,
    pub total: u32,
    pub previous: Option<u32>,
    pub next: Option<u32>,
    pub items: Vec<PageItem>,
}

impl PaginationControls {
    /// `None` when there is nothing to navigate (one page or fewer).
    pub fn build(current_page: u32, total_pages: u32) -> Option<Self> {
        if total_pages <= 1 {
            return None;
        }

        Some(Self {
            current: current_page,
            total: total_pages,
            previous: (current_page > 1).then(|| current_page - 1),
            next: (current_page < total_pages).then(|| current_page + 1),
            items: compute_window(current_page, total_pages, DEFAULT_MAX_VISIBLE),
        })
    }

    pub fn is_current(&self, page: &u32) -> bool {
        *page == self.current
    }

    /// Whether `page` is a valid navigation target.
    pub fn accepts(&self, page: u32) -> bool {
        (1..=self.total).contains(&page)
    }
}
