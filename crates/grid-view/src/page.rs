//! Page window over the filtered/sorted sequence

use crate::error::ViewError;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// `(offset, size)` window; `offset` is always a multiple of `size`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    offset: usize,
    size: usize,
}

impl PageWindow {
    /// Create window at the first page
    ///
    /// # Errors
    /// - `ViewError::Validation` if `size` is zero
    pub fn new(size: usize) -> Result<Self, ViewError> {
        if size == 0 {
            return Err(ViewError::validation("page size must be at least 1"));
        }
        Ok(Self { offset: 0, size })
    }

    /// Index of the first visible row
    #[inline]
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Rows per page
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Zero-based page number
    #[inline]
    #[must_use]
    pub fn page_number(&self) -> usize {
        self.offset / self.size
    }

    /// `ceil(total / size)`
    #[inline]
    #[must_use]
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.size)
    }

    /// Visible index range for a sequence of `total` rows
    #[must_use]
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = self.offset.min(total);
        let end = self.offset.saturating_add(self.size).min(total);
        start..end
    }

    /// One past the last visible row
    #[inline]
    #[must_use]
    pub fn ending_record(&self, total: usize) -> usize {
        self.range(total).end
    }

    /// Pull the offset back to the last non-empty page
    pub fn clamp(&mut self, total: usize) {
        let last_start = Self::last_page_start(total, self.size);
        self.offset = self.offset.min(last_start);
    }

    /// Back to the first page
    #[inline]
    pub fn first(&mut self) {
        self.offset = 0;
    }

    /// Jump to the last non-empty page
    #[inline]
    pub fn last(&mut self, total: usize) {
        self.offset = Self::last_page_start(total, self.size);
    }

    /// Advance one page; returns whether the window moved
    pub fn next(&mut self, total: usize) -> bool {
        let candidate = self.offset + self.size;
        if candidate < total {
            self.offset = candidate;
            true
        } else {
            false
        }
    }

    /// Go back one page; returns whether the window moved
    pub fn previous(&mut self) -> bool {
        if self.offset == 0 {
            return false;
        }
        self.offset = self.offset.saturating_sub(self.size);
        true
    }

    /// Jump to zero-based page `page`
    ///
    /// # Errors
    /// - `ViewError::Validation` if the page does not exist (page 0 always does)
    pub fn go_to(&mut self, page: usize, total: usize) -> Result<(), ViewError> {
        let pages = self.total_pages(total);
        if page != 0 && page >= pages {
            return Err(ViewError::validation(format!(
                "page {page} out of range ({pages} pages)"
            )));
        }
        self.offset = page * self.size;
        Ok(())
    }

    fn last_page_start(total: usize, size: usize) -> usize {
        if total == 0 {
            0
        } else {
            ((total - 1) / size) * size
        }
    }
}
