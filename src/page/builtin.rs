//! Built-in page types

use super::page_type::PageType;
use super::types::PageKind;
use crate::params::{ParamsFamily, CURSOR_PARAMS, LIMIT_OFFSET_PARAMS, PAGE_SIZE_PARAMS};
use std::sync::{Arc, LazyLock};

/// Page/size page: `items, total, page, size, pages`
pub static PAGE: LazyLock<Arc<PageType>> = LazyLock::new(|| {
    Arc::new(PageType::new(
        "Page",
        PageKind::PageSize,
        Arc::clone(&PAGE_SIZE_PARAMS),
    ))
});

/// Limit/offset page: `items, total, limit, offset`
pub static LIMIT_OFFSET_PAGE: LazyLock<Arc<PageType>> = LazyLock::new(|| {
    Arc::new(PageType::new(
        "LimitOffsetPage",
        PageKind::LimitOffset,
        Arc::clone(&LIMIT_OFFSET_PARAMS),
    ))
});

/// Cursor page: `items, total, current_page, ..., next_page`
pub static CURSOR_PAGE: LazyLock<Arc<PageType>> = LazyLock::new(|| {
    Arc::new(PageType::new(
        "CursorPage",
        PageKind::Cursor,
        Arc::clone(&CURSOR_PARAMS),
    ))
});

/// Page/size page with navigation links
pub static LINKS_PAGE: LazyLock<Arc<PageType>> = LazyLock::new(|| {
    Arc::new(
        PageType::new("LinksPage", PageKind::PageSize, Arc::clone(&PAGE_SIZE_PARAMS)).with_links(),
    )
});

/// Limit/offset page with navigation links
pub static LIMIT_OFFSET_LINKS_PAGE: LazyLock<Arc<PageType>> = LazyLock::new(|| {
    Arc::new(
        PageType::new(
            "LimitOffsetLinksPage",
            PageKind::LimitOffset,
            Arc::clone(&LIMIT_OFFSET_PARAMS),
        )
        .with_links(),
    )
});

/// Default page type for a params family
pub fn default_page_for(family: ParamsFamily) -> Arc<PageType> {
    match family {
        ParamsFamily::PageSize => Arc::clone(&PAGE),
        ParamsFamily::LimitOffset => Arc::clone(&LIMIT_OFFSET_PAGE),
        ParamsFamily::Cursor => Arc::clone(&CURSOR_PAGE),
    }
}
