//! Data source traits for adapters

use crate::params::{CursorRawParams, RawParams};
use async_trait::async_trait;

/// What a cursor fetch returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPageData<T> {
    /// Items of this page
    pub items: Vec<T>,
    /// Native token of the next page, `None` on the last page
    pub next: Option<Vec<u8>>,
    /// Native token of the previous page
    pub previous: Option<Vec<u8>>,
    /// Native backwards token of this page
    pub current_backwards: Option<Vec<u8>>,
    /// Total, only used when totals are requested
    pub total: Option<u64>,
}

impl<T> CursorPageData<T> {
    /// Page data with items and a next token
    pub fn new(items: Vec<T>, next: Option<Vec<u8>>) -> Self {
        Self {
            items,
            next,
            previous: None,
            current_backwards: None,
            total: None,
        }
    }

    /// Set the previous-page token
    #[must_use]
    pub fn with_previous(mut self, previous: Option<Vec<u8>>) -> Self {
        self.previous = previous;
        self
    }

    /// Set the backwards token of this page
    #[must_use]
    pub fn with_current_backwards(mut self, token: Option<Vec<u8>>) -> Self {
        self.current_backwards = token;
        self
    }

    /// Set the total
    #[must_use]
    pub fn with_total(mut self, total: Option<u64>) -> Self {
        self.total = total;
        self
    }
}

/// A backend that can count and fetch by limit/offset
#[async_trait]
pub trait LimitOffsetSource<T>: Send + Sync {
    /// Total number of items
    async fn count(&self) -> anyhow::Result<u64>;

    /// Items in the requested window
    async fn fetch(&self, raw: RawParams) -> anyhow::Result<Vec<T>>;
}

/// A backend that pages by opaque continuation tokens
#[async_trait]
pub trait CursorSource<T>: Send + Sync {
    /// Items after the given token
    async fn fetch(&self, raw: CursorRawParams) -> anyhow::Result<CursorPageData<T>>;
}
