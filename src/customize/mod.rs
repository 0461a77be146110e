//! Customize module
//!
//! Derives new page types from a base by applying an ordered list of
//! modifiers.
//!
//! # Overview
//!
//! ```text
//! base ──▶ PageNamespace ──▶ modifier 1 ──▶ ... ──▶ modifier n ──▶ PageType
//!          (seeded copy)      (pure steps, last write wins)      (parent = base)
//! ```
//!
//! Derived page types get their own params spec as soon as a params-level
//! modifier runs, so overrides never leak into the base. Page types are meant
//! to be built once, typically in a `LazyLock` static:
//!
//! ```ignore
//! static MY_PAGE: LazyLock<Arc<PageType>> = LazyLock::new(|| {
//!     CustomizedPage::of(&PAGE)
//!         .with(rename("MyPage"))
//!         .with(field_aliases([("total", "count")]))
//!         .build()
//!         .expect("valid page customization")
//! });
//! ```

mod modifiers;
mod namespace;

pub use modifiers::{
    additional_fields, cursor_encoding, exclude_fields, field_aliases, include_total,
    model_config, optional_params, params_fields, quoted_cursor, rename, reparent,
    response_headers, set_params, str_cursor, use_legacy_validator, Modifier, ParamOverride,
    QueryOverride,
};
pub use namespace::PageNamespace;

use crate::error::Result;
use crate::page::PageType;
use std::sync::Arc;

/// Derive a page type from `base`
///
/// An empty modifier list returns `base` itself.
pub fn customize(
    base: &Arc<PageType>,
    modifiers: impl IntoIterator<Item = Modifier>,
) -> Result<Arc<PageType>> {
    let modifiers: Vec<Modifier> = modifiers.into_iter().collect();
    if modifiers.is_empty() {
        return Ok(Arc::clone(base));
    }

    let mut ns = PageNamespace::from_page(base);
    for modifier in &modifiers {
        ns = modifier.apply(base, ns)?;
    }
    let derived = ns.into_page(base);

    tracing::debug!(
        base = %base.name(),
        derived = %derived.name(),
        modifiers = modifiers.len(),
        params_modifiers = modifiers.iter().filter(|m| m.customizes_params()).count(),
        "page type customized"
    );
    Ok(Arc::new(derived))
}

/// Builder form of [`customize`]
#[derive(Debug, Clone)]
pub struct CustomizedPage {
    base: Arc<PageType>,
    modifiers: Vec<Modifier>,
}

impl CustomizedPage {
    /// Start from a base page type
    pub fn of(base: &Arc<PageType>) -> Self {
        Self {
            base: Arc::clone(base),
            modifiers: Vec::new(),
        }
    }

    /// Append a modifier
    #[must_use]
    pub fn with(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Synthesize the page type
    pub fn build(self) -> Result<Arc<PageType>> {
        customize(&self.base, self.modifiers)
    }
}
