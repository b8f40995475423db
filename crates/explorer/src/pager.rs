//! Fixed-size paging over a listing.

use crate::lister::DirectoryEntry;

/// Default number of entries per page.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 12;

/// One page of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a> {
    /// Entries on this page.
    pub entries: &'a [DirectoryEntry],
    /// Zero-based page index after clamping.
    pub index: usize,
    /// Total number of pages (always at least 1).
    pub total_pages: usize,
    /// Number of entries across all pages.
    pub total_items: usize,
    /// Offset of the first entry of this page in the full listing.
    pub start: usize,
}

impl Page<'_> {
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.total_pages
    }

    pub fn is_paginated(&self) -> bool {
        self.total_pages > 1
    }

    /// One-based inclusive range of entries shown, for "showing X-Y of Z".
    pub fn showing(&self) -> (usize, usize) {
        (self.start + 1, self.start + self.entries.len())
    }
}

/// Outcome of paging a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paged<'a> {
    /// The listing has no entries.
    Empty,
    /// A page of a non-empty listing.
    Page(Page<'a>),
}

/// Number of pages needed for `total_items` (ceiling division).
pub fn total_pages(total_items: usize, per_page: usize) -> usize {
    total_items.div_ceil(per_page.max(1))
}

/// Slice out the requested page.
///
/// `requested` is clamped into the valid range: negative values select the
/// first page and values past the end select the last page.
pub fn paginate(entries: &[DirectoryEntry], requested: i64, per_page: usize) -> Paged<'_> {
    let per_page = per_page.max(1);
    let total_items = entries.len();
    if total_items == 0 {
        return Paged::Empty;
    }

    let total_pages = total_pages(total_items, per_page);
    let last = total_pages - 1;
    let index = if requested < 0 {
        0
    } else {
        usize::try_from(requested).map_or(last, |p| p.min(last))
    };

    let start = index * per_page;
    let end = (start + per_page).min(total_items);

    Paged::Page(Page {
        entries: &entries[start..end],
        index,
        total_pages,
        total_items,
        start,
    })
}
