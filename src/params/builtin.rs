//! Built-in params specs
//!
//! Page/size, limit/offset and cursor params, built from a
//! [`PaginationConfig`]. The process-wide defaults live in statics.

use super::spec::{FieldKind, ParamField, Params, ParamsSpec};
use super::types::ParamsFamily;
use crate::config::PaginationConfig;
use crate::error::Result;
use crate::types::JsonObject;
use serde_json::json;
use std::sync::{Arc, LazyLock};

/// Page/size params built from the default configuration
pub static PAGE_SIZE_PARAMS: LazyLock<Arc<ParamsSpec>> =
    LazyLock::new(|| Arc::new(page_size_spec(&PaginationConfig::default())));

/// Limit/offset params built from the default configuration
pub static LIMIT_OFFSET_PARAMS: LazyLock<Arc<ParamsSpec>> =
    LazyLock::new(|| Arc::new(limit_offset_spec(&PaginationConfig::default())));

/// Cursor params built from the default configuration
pub static CURSOR_PARAMS: LazyLock<Arc<ParamsSpec>> =
    LazyLock::new(|| Arc::new(cursor_spec(&PaginationConfig::default())));

fn bound(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Page/size params: `page >= 1`, `1 <= size <= max_page_size`
pub fn page_size_spec(config: &PaginationConfig) -> ParamsSpec {
    let mut spec = ParamsSpec::new(
        "Params",
        ParamsFamily::PageSize,
        vec![
            ParamField::new("page", FieldKind::bounded(Some(1), None))
                .with_default(1)
                .with_description("Page number"),
            ParamField::new(
                "size",
                FieldKind::bounded(Some(1), Some(bound(config.max_page_size))),
            )
            .with_default(config.default_page_size)
            .with_description("Page size"),
        ],
    );
    spec.set_constant(super::spec::INCLUDE_TOTAL, json!(config.include_total));
    spec
}

/// Limit/offset params: `1 <= limit <= max_limit`, `offset >= 0`
pub fn limit_offset_spec(config: &PaginationConfig) -> ParamsSpec {
    let mut spec = ParamsSpec::new(
        "LimitOffsetParams",
        ParamsFamily::LimitOffset,
        vec![
            ParamField::new(
                "limit",
                FieldKind::bounded(Some(1), Some(bound(config.max_limit))),
            )
            .with_default(config.default_limit)
            .with_description("Page size limit"),
            ParamField::new("offset", FieldKind::bounded(Some(0), None))
                .with_default(0)
                .with_description("Page offset"),
        ],
    );
    spec.set_constant(super::spec::INCLUDE_TOTAL, json!(config.include_total));
    spec
}

/// Cursor params: optional `cursor`, `size >= 0`
pub fn cursor_spec(config: &PaginationConfig) -> ParamsSpec {
    let mut spec = ParamsSpec::new(
        "CursorParams",
        ParamsFamily::Cursor,
        vec![
            ParamField::new("cursor", FieldKind::String)
                .with_default(serde_json::Value::Null)
                .with_description("Cursor for the next page"),
            ParamField::new(
                "size",
                FieldKind::bounded(Some(0), config.max_cursor_size.map(bound)),
            )
            .with_default(config.default_cursor_size)
            .with_description("Page size"),
        ],
    );
    spec.set_constant(
        super::spec::INCLUDE_TOTAL,
        json!(config.cursor_include_total),
    );
    spec
}

/// Explicit page/size params against the built-in params type
pub fn page_params(page: u64, size: u64) -> Result<Params> {
    PAGE_SIZE_PARAMS.instantiate(object(json!({ "page": page, "size": size })))
}

/// Explicit limit/offset params against the built-in params type
pub fn limit_offset_params(limit: u64, offset: u64) -> Result<Params> {
    LIMIT_OFFSET_PARAMS.instantiate(object(json!({ "limit": limit, "offset": offset })))
}

/// Explicit cursor params against the built-in params type
pub fn cursor_params(cursor: Option<&str>, size: u64) -> Result<Params> {
    CURSOR_PARAMS.instantiate(object(json!({ "cursor": cursor, "size": size })))
}

fn object(value: serde_json::Value) -> JsonObject {
    match value {
        serde_json::Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}
