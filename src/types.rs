//! Common types used throughout pagewise
//!
//! Shared type aliases and small helpers used across multiple modules.

use std::sync::atomic::{AtomicU64, Ordering};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Type Identity
// ============================================================================

static NEXT_TYPE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a synthesized params or page type
///
/// Every `ParamsSpec` and `PageType` gets a fresh id when it is built, so
/// two derived types with the same name are still distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u64);

impl TypeId {
    /// Allocate a new unique id
    pub fn next() -> Self {
        Self(NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Integer ceiling division, `None` when the divisor is zero
pub fn ceil_div(numerator: u64, denominator: u64) -> Option<u64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator.div_ceil(denominator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ids_are_unique() {
        let a = TypeId::next();
        let b = TypeId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn test_ceil_div() {
        assert_eq!(ceil_div(100, 10), Some(10));
        assert_eq!(ceil_div(101, 10), Some(11));
        assert_eq!(ceil_div(0, 10), Some(0));
        assert_eq!(ceil_div(5, 0), None);
    }
}
