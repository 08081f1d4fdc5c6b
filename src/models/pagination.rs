//! Page windowing for list views.

use serde::{Deserialize, Serialize};

use super::config::PageWindow;

/// Position of a list page inside its collection.
///
/// Built fresh from every API response and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    page: usize,
    page_size: usize,
    total_count: usize,
}

impl PaginationInfo {
    /// Create pagination info, clamping `page` into `0..max(page_count, 1)`.
    pub fn new(page: usize, page_size: usize, total_count: usize) -> Self {
        let page_size = page_size.max(1);
        let page_count = total_count.div_ceil(page_size);
        Self {
            page: page.min(page_count.max(1) - 1),
            page_size,
            total_count,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn page_count(&self) -> usize {
        self.total_count.div_ceil(self.page_size)
    }

    pub fn last_page(&self) -> usize {
        self.page_count().max(1) - 1
    }
}

/// One entry of a pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    /// Link to a zero-based page index
    Page(usize),
    /// Omitted range; prompts for an arbitrary page when clicked
    Ellipsis,
}

/// Compute the page links to display for `info`.
///
/// Returns nothing when the collection is empty.
pub fn compute_page_links(info: &PaginationInfo, window: &PageWindow) -> Vec<PageLink> {
    if info.total_count() < 1 {
        return Vec::new();
    }

    let page_count = info.page_count();
    let page = info.page();
    let PageWindow {
        before,
        middle,
        after,
    } = *window;

    let range = |start: usize, end: usize| (start..end).map(PageLink::Page);
    let mut links = Vec::new();

    if page_count <= before + middle + after {
        links.extend(range(0, page_count));
    } else if page < (after + middle).saturating_sub(1) {
        links.extend(range(0, after + middle));
        links.push(PageLink::Ellipsis);
        links.extend(range(page_count - after, page_count));
    } else if page > page_count - (middle + after) {
        links.extend(range(0, before));
        links.push(PageLink::Ellipsis);
        links.extend(range(page_count - (middle + after), page_count));
    } else {
        let start = page - middle / 2;
        links.extend(range(0, before));
        links.push(PageLink::Ellipsis);
        links.extend(range(start, start + middle));
        links.push(PageLink::Ellipsis);
        links.extend(range(page_count - after, page_count));
    }

    links
}

/// Parse the answer to the ellipsis prompt into a zero-based page index.
///
/// Only positive integers are accepted; the result is clamped to the last page.
pub fn parse_page_prompt(input: &str, info: &PaginationInfo) -> Option<usize> {
    let number: usize = input.trim().parse().ok()?;
    if number == 0 {
        return None;
    }
    Some((number - 1).min(info.last_page()))
}
