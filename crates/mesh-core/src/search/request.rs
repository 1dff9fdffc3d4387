//! Search request / result DTOs
//!
//! `SearchRequest` is the boundary object services accept for structured
//! queries: a root predicate plus paging.

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use super::predicate::{PrettyPrint, SearchPredicate};
use crate::error::DomainError;

/// Largest page a client may request
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Structured search query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[serde(default)]
    pub predicate: SearchPredicate,

    #[serde(default)]
    pub page: u32,

    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 1000, message = "Page size must be 1-1000"))]
    pub size: u32,
}

fn default_page_size() -> u32 {
    20
}

impl SearchRequest {
    /// Build a request from any number of predicates
    ///
    /// - none: an empty AND (matches everything, renders as "")
    /// - one: that predicate is the root, unwrapped
    /// - several: an implicit AND over all of them
    pub fn new<I>(predicates: I) -> Self
    where
        I: IntoIterator<Item = SearchPredicate>,
    {
        let mut predicates: Vec<SearchPredicate> = predicates.into_iter().collect();
        let predicate = if predicates.len() == 1 {
            predicates.remove(0)
        } else {
            SearchPredicate::and(predicates)
        };

        Self {
            predicate,
            page: 0,
            size: default_page_size(),
        }
    }

    /// Set the page index and size
    pub fn with_page(mut self, page: u32, size: u32) -> Self {
        self.page = page;
        self.size = size;
        self
    }

    /// Validate paging bounds, returning the request unchanged on success
    pub fn validated(self) -> Result<Self, DomainError> {
        self.validate()?;
        Ok(self)
    }

    /// Number of items to skip for the requested page
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Check if the request places no restriction on results
    pub fn is_unfiltered(&self) -> bool {
        self.predicate.to_string().is_empty()
    }
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::new([])
    }
}

impl From<SearchPredicate> for SearchRequest {
    fn from(predicate: SearchPredicate) -> Self {
        Self::new([predicate])
    }
}

impl fmt::Display for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.predicate, f)
    }
}

impl PrettyPrint for SearchRequest {
    fn to_pretty_string(&self) -> String {
        self.predicate.to_pretty_string()
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

impl<T> SearchResult<T> {
    /// Wrap the items fetched for `request`
    pub fn new(items: Vec<T>, request: &SearchRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            size: request.size,
            total,
        }
    }

    /// Total number of pages (zero when there are no results)
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.size))
    }

    /// Check if another page follows this one
    pub fn has_next(&self) -> bool {
        u64::from(self.page) + 1 < self.total_pages()
    }

    /// Transform the items, keeping paging information
    pub fn map<U, F>(self, f: F) -> SearchResult<U>
    where
        F: FnMut(T) -> U,
    {
        SearchResult {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total: self.total,
        }
    }
}
