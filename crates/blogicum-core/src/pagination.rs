//! Fixed-size page arithmetic for post listings.

use serde::Serialize;

use crate::error::DomainError;

/// Posts per listing page.
pub const PAGE_SIZE: u64 = 10;

/// The page a listing request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// A 1-based page number.
    Number(u64),
    /// `?page=last`, known only once the listing is counted.
    Last,
}

impl PageRequest {
    pub fn new(number: u64) -> Result<Self, DomainError> {
        if number == 0 {
            return Err(DomainError::not_found("page", number));
        }
        Ok(Self::Number(number))
    }

    pub fn first() -> Self {
        Self::Number(1)
    }

    /// Parse the `?page=` query value. A missing value is the first page.
    pub fn parse(raw: Option<&str>) -> Result<Self, DomainError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::first()),
            Some("last") => Ok(Self::Last),
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| DomainError::not_found("page", value))
                .and_then(Self::new),
        }
    }

    /// The 1-based page number for a listing of `total_items`.
    pub fn resolve(self, total_items: u64) -> u64 {
        match self {
            Self::Number(number) => number,
            Self::Last => num_pages(total_items),
        }
    }
}

/// Rows to skip before page `number`.
pub fn offset(number: u64) -> u64 {
    number.saturating_sub(1).saturating_mul(PAGE_SIZE)
}

/// Number of pages for `total_items`. An empty listing still has one page.
pub fn num_pages(total_items: u64) -> u64 {
    total_items.div_ceil(PAGE_SIZE).max(1)
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub total_items: u64,
}

impl<T> Page<T> {
    /// Cut a page out of an already filtered and ordered list.
    pub fn from_vec(all: Vec<T>, request: PageRequest) -> Self {
        let total_items = all.len() as u64;
        let number = request.resolve(total_items);
        let skip = usize::try_from(offset(number)).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(skip).take(PAGE_SIZE as usize).collect();
        Self {
            items,
            number,
            total_items,
        }
    }

    pub fn num_pages(&self) -> u64 {
        num_pages(self.total_items)
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages()
    }

    pub fn previous_number(&self) -> u64 {
        self.number.saturating_sub(1).max(1)
    }

    pub fn next_number(&self) -> u64 {
        (self.number + 1).min(self.num_pages())
    }

    /// A page past the end is not found, except the first page of an empty
    /// listing.
    pub fn ensure_in_range(self) -> Result<Self, DomainError> {
        if self.number > self.num_pages() {
            return Err(DomainError::not_found("page", self.number));
        }
        Ok(self)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            total_items: self.total_items,
        }
    }
}
