//! Raw params and shape tags
//!
//! The normalized forms every params spec reduces to before a backend sees
//! them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized shape a params spec produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParamsShape {
    /// `limit` + `offset`
    LimitOffset,
    /// Opaque cursor + size
    Cursor,
}

impl fmt::Display for ParamsShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LimitOffset => write!(f, "limit-offset"),
            Self::Cursor => write!(f, "cursor"),
        }
    }
}

/// Family of a params spec, decides how values map to raw params
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParamsFamily {
    /// `page` + `size`
    PageSize,
    /// `limit` + `offset`
    LimitOffset,
    /// `cursor` + `size`
    Cursor,
}

impl ParamsFamily {
    /// Raw shape produced by this family
    pub fn shape(self) -> ParamsShape {
        match self {
            Self::PageSize | Self::LimitOffset => ParamsShape::LimitOffset,
            Self::Cursor => ParamsShape::Cursor,
        }
    }
}

impl fmt::Display for ParamsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageSize => write!(f, "page-size"),
            Self::LimitOffset => write!(f, "limit-offset"),
            Self::Cursor => write!(f, "cursor"),
        }
    }
}

/// Normalized limit/offset params
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawParams {
    /// Maximum number of items, `None` for unbounded
    pub limit: Option<u64>,
    /// Number of items to skip
    pub offset: u64,
    /// Whether the total count should be computed
    pub include_total: bool,
}

impl Default for RawParams {
    fn default() -> Self {
        Self {
            limit: None,
            offset: 0,
            include_total: true,
        }
    }
}

impl RawParams {
    /// Create raw params with total counting enabled
    pub fn new(limit: Option<u64>, offset: u64) -> Self {
        Self {
            limit,
            offset,
            include_total: true,
        }
    }

    /// Set whether to count the total
    #[must_use]
    pub fn with_include_total(mut self, include_total: bool) -> Self {
        self.include_total = include_total;
        self
    }

    /// Index range into a collection of `len` items
    pub fn as_range(&self, len: usize) -> std::ops::Range<usize> {
        let start = usize::try_from(self.offset).unwrap_or(usize::MAX).min(len);
        let end = match self.limit {
            Some(limit) => start
                .saturating_add(usize::try_from(limit).unwrap_or(usize::MAX))
                .min(len),
            None => len,
        };
        start..end
    }
}

/// Normalized cursor params
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CursorRawParams {
    /// Decoded continuation token, `None` for the first page
    pub cursor: Option<Vec<u8>>,
    /// Maximum number of items
    pub size: Option<u64>,
    /// Whether the total count should be computed
    pub include_total: bool,
}

impl CursorRawParams {
    /// Create cursor raw params
    pub fn new(cursor: Option<Vec<u8>>, size: Option<u64>) -> Self {
        Self {
            cursor,
            size,
            include_total: false,
        }
    }

    /// Cursor as UTF-8 text, if it is valid UTF-8
    pub fn cursor_str(&self) -> Option<&str> {
        self.cursor
            .as_deref()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }
}

/// Either raw form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyRawParams {
    /// Limit/offset form
    LimitOffset(RawParams),
    /// Cursor form
    Cursor(CursorRawParams),
}

impl AnyRawParams {
    /// Shape tag of this raw form
    pub fn shape(&self) -> ParamsShape {
        match self {
            Self::LimitOffset(_) => ParamsShape::LimitOffset,
            Self::Cursor(_) => ParamsShape::Cursor,
        }
    }

    /// Whether the total should be counted
    pub fn include_total(&self) -> bool {
        match self {
            Self::LimitOffset(raw) => raw.include_total,
            Self::Cursor(raw) => raw.include_total,
        }
    }

    /// Effective item cap
    pub fn limit(&self) -> Option<u64> {
        match self {
            Self::LimitOffset(raw) => raw.limit,
            Self::Cursor(raw) => raw.size,
        }
    }

    /// Limit/offset form, if that is the shape
    pub fn as_limit_offset(&self) -> Option<&RawParams> {
        match self {
            Self::LimitOffset(raw) => Some(raw),
            Self::Cursor(_) => None,
        }
    }

    /// Cursor form, if that is the shape
    pub fn as_cursor(&self) -> Option<&CursorRawParams> {
        match self {
            Self::Cursor(raw) => Some(raw),
            Self::LimitOffset(_) => None,
        }
    }
}
