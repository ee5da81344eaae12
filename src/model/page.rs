use serde::Serialize;

/// Reference to a page by offset and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub skip_count: usize,
    pub page_size: usize,
}

/// Bounded slice of a result set plus the total number of matching items.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub skip_count: usize,
    pub page_size: usize,
    pub total_count: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, skip_count: usize, page_size: usize, total_count: usize) -> Self {
        Self {
            items,
            skip_count,
            page_size,
            total_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next_page(&self) -> bool {
        self.skip_count.saturating_add(self.items.len()) < self.total_count
    }

    pub fn has_previous_page(&self) -> bool {
        self.skip_count > 0
    }

    pub fn next_page_ref(&self) -> Option<PageRef> {
        if !self.has_next_page() {
            return None;
        }
        Some(PageRef {
            skip_count: self.skip_count.saturating_add(self.page_size),
            page_size: self.page_size,
        })
    }

    pub fn previous_page_ref(&self) -> Option<PageRef> {
        if !self.has_previous_page() {
            return None;
        }
        Some(PageRef {
            skip_count: self.skip_count.saturating_sub(self.page_size),
            page_size: self.page_size,
        })
    }

    pub fn first_page_ref(&self) -> PageRef {
        PageRef {
            skip_count: 0,
            page_size: self.page_size,
        }
    }

    /// Page holding the last items, aligned to the current offset.
    ///
    /// Offsets past the end, however large, are their own last page.
    pub fn last_page_ref(&self) -> PageRef {
        if self.page_size == 0 || self.total_count <= self.skip_count.saturating_add(self.page_size)
        {
            return PageRef {
                skip_count: self.skip_count,
                page_size: self.page_size,
            };
        }
        let remaining = self.total_count - self.skip_count;
        let full_pages = (remaining - 1) / self.page_size;
        PageRef {
            skip_count: self
                .skip_count
                .saturating_add(full_pages.saturating_mul(self.page_size)),
            page_size: self.page_size,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            skip_count: self.skip_count,
            page_size: self.page_size,
            total_count: self.total_count,
        }
    }
}
