use serde::{Deserialize, Serialize};

/// Default number of posts per listing page.
pub const DEFAULT_PER_PAGE: u64 = 3;
/// Upper bound on a caller-chosen page size.
pub const MAX_PER_PAGE: u64 = 50;

/// A requested page, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Build a request from loose query input. A missing or zero page is page 1.
    pub fn new(page: Option<u64>, per_page: Option<u64>, default_per_page: u64) -> Self {
        let per_page = per_page
            .filter(|n| *n > 0)
            .unwrap_or(default_per_page)
            .clamp(1, MAX_PER_PAGE);
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(1),
            per_page,
        }
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page).max(1)
    }

    /// Clamp to the last page when the requested page is past the end.
    pub fn clamp_to(self, total: u64) -> Self {
        Self {
            page: self.page.min(self.total_pages(total)),
            per_page: self.per_page,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.per_page
    }
}

/// One page of results plus enough metadata to render pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Paged<T> {
    /// `request` must already be clamped to `total`.
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages: request.total_pages(total),
        }
    }

    /// Slice an already-ordered, fully materialized result set.
    pub fn from_all(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let request = request.clamp_to(total);
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.per_page as usize)
            .collect();
        Self::new(items, request, total)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}
