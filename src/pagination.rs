// Raffle DApp - Pagination
use std::ops::Range;

/// Entries shown per page of the participant list
pub const PAGE_SIZE: usize = 5;

/// 1-based page position over a list whose length is supplied per call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageCursor {
    page: usize,
    page_size: usize,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PAGE_SIZE,
        }
    }
}

impl PageCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor positioned on `page`, clamped to at least 1
    pub fn at(page: usize) -> Self {
        Self {
            page: page.max(1),
            ..Self::default()
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// `ceil(len / page_size)`; an empty list has no pages
    pub fn total_pages(&self, len: usize) -> usize {
        (len + self.page_size - 1) / self.page_size
    }

    /// Index range `[(page-1)*size, page*size)` clamped to `len`
    pub fn range(&self, len: usize) -> Range<usize> {
        let end = (self.page * self.page_size).min(len);
        let start = ((self.page - 1) * self.page_size).min(end);
        start..end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self, len: usize) -> bool {
        self.page < self.total_pages(len)
    }

    /// Advance one page. Returns false on the last page.
    pub fn next(&mut self, len: usize) -> bool {
        if !self.has_next(len) {
            return false;
        }
        self.page += 1;
        true
    }

    /// Go back one page. Returns false on the first page.
    pub fn previous(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.page -= 1;
        true
    }
}
