//! Tests for params module

use super::*;
use crate::config::PaginationConfig;
use crate::error::Error;
use serde_json::json;
use std::sync::Arc;
use test_case::test_case;

fn raw(params: &Params) -> RawParams {
    *params
        .to_raw_params()
        .unwrap()
        .as_limit_offset()
        .expect("limit-offset shape")
}

// ============================================================================
// Page/Size Params
// ============================================================================

#[test]
fn test_page_size_defaults() {
    let params = PAGE_SIZE_PARAMS.bind_query(None).unwrap();
    assert_eq!(params.get_u64("page"), Some(1));
    assert_eq!(params.get_u64("size"), Some(50));
    assert_eq!(raw(&params), RawParams::new(Some(50), 0));
}

#[test_case(1, 10, 0 ; "first page")]
#[test_case(2, 10, 10 ; "second page")]
#[test_case(7, 15, 90 ; "seventh page")]
#[test_case(3, 100, 200 ; "max size")]
fn test_page_size_to_raw(page: u64, size: u64, offset: u64) {
    let params = page_params(page, size).unwrap();
    let raw = raw(&params);
    assert_eq!(raw.limit, Some(size));
    assert_eq!(raw.offset, offset);
    assert!(raw.include_total);
}

#[test_case("page=0", "page", "greater_than_equal" ; "page below one")]
#[test_case("size=0", "size", "greater_than_equal" ; "size below one")]
#[test_case("size=101", "size", "less_than_equal" ; "size above max")]
#[test_case("page=abc", "page", "int_parsing" ; "page not a number")]
fn test_page_size_bounds(query: &str, field: &str, kind: &str) {
    let err = PAGE_SIZE_PARAMS.bind_query(Some(query)).unwrap_err();
    match err {
        Error::InvalidParams { issues } => {
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].loc, vec!["query".to_string(), field.to_string()]);
            assert_eq!(issues[0].kind, kind);
        }
        other => panic!("Expected InvalidParams, got {other:?}"),
    }
}

#[test]
fn test_multiple_issues_are_collected() {
    let err = PAGE_SIZE_PARAMS
        .bind_query(Some("page=0&size=1000"))
        .unwrap_err();
    if let Error::InvalidParams { issues } = err {
        assert_eq!(issues.len(), 2);
    } else {
        panic!("Expected InvalidParams");
    }
}

#[test]
fn test_first_query_value_wins() {
    let params = PAGE_SIZE_PARAMS.bind_query(Some("page=3&page=9")).unwrap();
    assert_eq!(params.get_u64("page"), Some(3));
}

// ============================================================================
// Limit/Offset Params
// ============================================================================

#[test]
fn test_limit_offset_identity() {
    let params = LIMIT_OFFSET_PARAMS
        .bind_query(Some("limit=10&offset=20"))
        .unwrap();
    assert_eq!(raw(&params), RawParams::new(Some(10), 20));
}

#[test_case("limit=0" ; "limit below one")]
#[test_case("limit=101" ; "limit above max")]
#[test_case("offset=-1" ; "negative offset")]
fn test_limit_offset_bounds(query: &str) {
    assert!(matches!(
        LIMIT_OFFSET_PARAMS.bind_query(Some(query)),
        Err(Error::InvalidParams { .. })
    ));
}

#[test]
fn test_raw_params_range() {
    assert_eq!(RawParams::new(Some(10), 20).as_range(23), 20..23);
    assert_eq!(RawParams::new(Some(10), 30).as_range(23), 23..23);
    assert_eq!(RawParams::new(None, 5).as_range(23), 5..23);
}

// ============================================================================
// Cursor Params
// ============================================================================

#[test]
fn test_cursor_defaults() {
    let params = CURSOR_PARAMS.bind_query(None).unwrap();
    let raw = params.to_raw_params().unwrap();
    let cursor = raw.as_cursor().unwrap();
    assert_eq!(cursor.cursor, None);
    assert_eq!(cursor.size, Some(50));
    assert!(!cursor.include_total);
    assert_eq!(raw.shape(), ParamsShape::Cursor);
}

#[test]
fn test_cursor_decodes_token() {
    let params = CURSOR_PARAMS.bind_query(Some("cursor=MTA%3D&size=10")).unwrap();
    let raw = params.to_raw_params().unwrap();
    let cursor = raw.as_cursor().unwrap();
    assert_eq!(cursor.cursor.as_deref(), Some(b"10".as_slice()));
    assert_eq!(cursor.cursor_str(), Some("10"));
    assert_eq!(cursor.size, Some(10));
}

#[test]
fn test_cursor_invalid_token() {
    let params = cursor_params(Some("not-base64"), 10).unwrap();
    let err = params.to_raw_params().unwrap_err();
    assert!(matches!(err, Error::InvalidCursor { .. }));
}

#[test]
fn test_cursor_str_requires_utf8() {
    // "_w==" is a single 0xff byte
    let params = cursor_params(Some("_w=="), 10).unwrap();
    assert!(matches!(
        params.to_raw_params(),
        Err(Error::InvalidCursor { .. })
    ));

    let mut spec = CURSOR_PARAMS.subclass();
    spec.set_constant(STR_CURSOR, json!(false));
    let spec = Arc::new(spec);
    let params = spec.bind_query(Some("cursor=_w%3D%3D")).unwrap();
    let raw = params.to_raw_params().unwrap();
    assert_eq!(raw.as_cursor().unwrap().cursor.as_deref(), Some([0xff].as_slice()));
}

// ============================================================================
// Spec Derivation
// ============================================================================

#[test]
fn test_subclass_relation() {
    let child = Arc::new(PAGE_SIZE_PARAMS.subclass());
    let grandchild = Arc::new(child.subclass());

    assert!(grandchild.is_subclass_of(&child));
    assert!(grandchild.is_subclass_of(&PAGE_SIZE_PARAMS));
    assert!(!PAGE_SIZE_PARAMS.is_subclass_of(&child));
    assert!(!child.is_subclass_of(&LIMIT_OFFSET_PARAMS));
    assert_ne!(child.id(), PAGE_SIZE_PARAMS.id());
}

#[test]
fn test_include_total_constant() {
    let mut spec = LIMIT_OFFSET_PARAMS.subclass();
    spec.set_constant(INCLUDE_TOTAL, json!(false));
    let params = Arc::new(spec).bind_query(None).unwrap();
    assert!(!params.to_raw_params().unwrap().include_total());
}

#[test]
fn test_optional_params() {
    let mut spec = PAGE_SIZE_PARAMS.subclass();
    spec.make_optional();
    let spec = Arc::new(spec);
    assert!(spec.fields().iter().all(|f| !f.is_required()));

    let params = spec.bind_query(None).unwrap();
    assert_eq!(params.get("page"), None);
    assert_eq!(raw(&params), RawParams::new(None, 0));
}

#[test]
fn test_alias_changes_query_name() {
    let mut spec = PAGE_SIZE_PARAMS.subclass();
    let field = spec.field("size").unwrap().clone().with_alias("per_page");
    spec.replace_field(field).unwrap();
    let spec = Arc::new(spec);

    let params = spec.bind_query(Some("per_page=7&size=99")).unwrap();
    assert_eq!(params.get_u64("size"), Some(7));
}

#[test]
fn test_required_field() {
    let spec = Arc::new(ParamsSpec::new(
        "Strict",
        ParamsFamily::LimitOffset,
        vec![
            ParamField::new("limit", FieldKind::integer()),
            ParamField::new("offset", FieldKind::integer()).with_default(0),
        ],
    ));
    let err = spec.bind_query(None).unwrap_err();
    if let Error::InvalidParams { issues } = err {
        assert_eq!(issues[0].kind, "missing");
    } else {
        panic!("Expected InvalidParams");
    }
}

#[test]
fn test_instantiate_rejects_unknown_fields() {
    let err = PAGE_SIZE_PARAMS
        .instantiate(serde_json::Map::from_iter([("pgae".to_string(), json!(2))]))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownField { fields, .. } if fields == vec!["pgae"]));
}

#[test]
fn test_config_driven_bounds() {
    let config = PaginationConfig::new()
        .with_max_page_size(20)
        .with_default_page_size(5);
    let spec = Arc::new(page_size_spec(&config));
    assert_eq!(spec.bind_query(None).unwrap().get_u64("size"), Some(5));
    assert!(spec.bind_query(Some("size=21")).is_err());
}

#[test]
fn test_openapi_parameters() {
    let params = PAGE_SIZE_PARAMS.openapi_parameters();
    assert_eq!(params.len(), 2);
    assert_eq!(params[1]["name"], "size");
    assert_eq!(params[1]["in"], "query");
    assert_eq!(params[1]["required"], false);
    assert_eq!(params[1]["schema"]["maximum"], 100);
    assert_eq!(params[1]["schema"]["default"], 50);
}
