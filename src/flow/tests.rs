//! Tests for flow module

use super::*;
use crate::context::PaginationContext;
use crate::customize::{self, additional_fields, include_total};
use crate::page::{AdditionalField, FieldType, CURSOR_PAGE, LIMIT_OFFSET_PAGE, PAGE};
use crate::params::{cursor_params, limit_offset_params, page_params};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

fn numbers(range: std::ops::Range<u32>) -> Vec<u32> {
    range.collect()
}

fn window(raw: RawParams) -> Vec<u32> {
    let all = numbers(0..95);
    all[raw.as_range(all.len())].to_vec()
}

fn object(value: JsonValue) -> JsonObject {
    value.as_object().cloned().unwrap_or_default()
}

// ============================================================================
// Sync flow
// ============================================================================

#[test]
fn test_paginate_page_size() {
    let page = Flow::<u32>::new(&[ParamsShape::LimitOffset])
        .params(page_params(2, 10).unwrap())
        .paginate(|| Ok(95), |raw| Ok(window(raw)))
        .unwrap();

    assert_eq!(page.items(), numbers(10..20).as_slice());
    assert_eq!(page.total(), Some(95));
    assert_eq!(page.meta().pages, Some(10));
    assert_eq!(page.page_type().name(), "Page");
}

#[test]
fn test_paginate_limit_offset_uses_matching_default_page() {
    let page = Flow::<u32>::new(&[ParamsShape::LimitOffset])
        .params(limit_offset_params(5, 90).unwrap())
        .paginate(|| Ok(95), |raw| Ok(window(raw)))
        .unwrap();

    assert_eq!(page.page_type().id(), LIMIT_OFFSET_PAGE.id());
    assert_eq!(page.items(), numbers(90..95).as_slice());
    assert_eq!(page.meta().offset, Some(90));
}

#[test]
fn test_count_not_called_without_total() {
    let page_type = customize::customize(&PAGE, [include_total(false)]).unwrap();
    let params = page_type
        .params()
        .instantiate(object(json!({ "page": 1, "size": 10 })))
        .unwrap();
    let calls = AtomicUsize::new(0);

    let page = Flow::<u32>::new(&[ParamsShape::LimitOffset])
        .params(params)
        .page_type(&page_type)
        .paginate(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(95)
            },
            |raw| Ok(window(raw)),
        )
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(page.total(), None);
    assert_eq!(page.meta().pages, None);
}

#[test]
fn test_count_called_once_with_total() {
    let calls = AtomicUsize::new(0);
    Flow::<u32>::new(&[ParamsShape::LimitOffset])
        .params(page_params(1, 10).unwrap())
        .paginate(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(95)
            },
            |raw| Ok(window(raw)),
        )
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_over_fetch_is_truncated() {
    let page = Flow::<u32>::new(&[ParamsShape::LimitOffset])
        .params(page_params(1, 3).unwrap())
        .paginate(|| Ok(95), |_| Ok(numbers(0..10)))
        .unwrap();
    assert_eq!(page.items(), &[0, 1, 2]);
}

#[test]
fn test_sync_transformer() {
    let page = Flow::<u32>::new(&[ParamsShape::LimitOffset])
        .params(page_params(1, 3).unwrap())
        .transformer(|items: Vec<u32>| {
            items
                .into_iter()
                .map(|n| format!("#{n}"))
                .collect::<Vec<String>>()
        })
        .paginate(|| Ok(95), |raw| Ok(window(raw)))
        .unwrap();
    assert_eq!(page.items(), &["#0", "#1", "#2"]);
}

#[test]
fn test_async_transformer_rejected_by_sync_flow() {
    let fetched = AtomicUsize::new(0);
    let err = Flow::<u32>::new(&[ParamsShape::LimitOffset])
        .params(page_params(1, 3).unwrap())
        .async_transformer(|items: Vec<u32>| async move { items })
        .paginate(
            || Ok(95),
            |raw| {
                fetched.fetch_add(1, Ordering::SeqCst);
                Ok(window(raw))
            },
        )
        .unwrap_err();

    assert!(matches!(err, Error::AsyncTransformer));
    assert_eq!(fetched.load(Ordering::SeqCst), 0);
}

#[test]
fn test_shape_unsupported_lists_accepted() {
    let err = Flow::<u32>::new(&[ParamsShape::Cursor])
        .params(page_params(1, 10).unwrap())
        .paginate(|| Ok(95), |raw| Ok(window(raw)))
        .unwrap_err();

    match err {
        Error::ParamsShapeUnsupported { accepted, actual } => {
            assert_eq!(accepted, vec![ParamsShape::Cursor]);
            assert_eq!(actual, ParamsShape::LimitOffset);
        }
        other => panic!("Expected ParamsShapeUnsupported, got {other:?}"),
    }
}

#[test]
fn test_cursor_params_rejected_by_limit_offset_operation() {
    let err = Flow::<u32>::new(&[ParamsShape::LimitOffset, ParamsShape::Cursor])
        .params(cursor_params(None, 10).unwrap())
        .paginate(|| Ok(95), |raw| Ok(window(raw)))
        .unwrap_err();
    match err {
        Error::ParamsShapeUnsupported { accepted, actual } => {
            assert_eq!(accepted, vec![ParamsShape::LimitOffset, ParamsShape::Cursor]);
            assert_eq!(actual, ParamsShape::Cursor);
        }
        other => panic!("Expected ParamsShapeUnsupported, got {other:?}"),
    }
}

#[test]
fn test_limit_offset_params_rejected_by_cursor_operation() {
    let err = Flow::<u32>::new(&[ParamsShape::Cursor, ParamsShape::LimitOffset])
        .params(page_params(1, 10).unwrap())
        .paginate_cursor(|_| Ok(CursorPageData::new(Vec::new(), None)))
        .unwrap_err();

    match err {
        Error::ParamsShapeUnsupported { accepted, actual } => {
            assert_eq!(accepted, vec![ParamsShape::Cursor, ParamsShape::LimitOffset]);
            assert_eq!(actual, ParamsShape::LimitOffset);
        }
        other => panic!("Expected ParamsShapeUnsupported, got {other:?}"),
    }
}

#[test]
fn test_adapter_error_propagates() {
    let err = Flow::<u32>::new(&[ParamsShape::LimitOffset])
        .params(page_params(1, 10).unwrap())
        .paginate(|| Ok(95), |_| Err(anyhow::anyhow!("connection reset")))
        .unwrap_err();

    assert!(matches!(err, Error::Adapter(_)));
    assert!(err.to_string().contains("connection reset"));
}

#[test]
fn test_without_params_or_context_is_uninitialized() {
    let err = Flow::<u32>::new(&[ParamsShape::LimitOffset])
        .paginate(|| Ok(95), |raw| Ok(window(raw)))
        .unwrap_err();
    assert!(matches!(err, Error::UninitializedPage { slot: "params" }));
}

#[test]
fn test_explicit_page_type_must_match_params() {
    let err = Flow::<u32>::new(&[ParamsShape::LimitOffset])
        .params(limit_offset_params(10, 0).unwrap())
        .page_type(&PAGE)
        .paginate(|| Ok(95), |raw| Ok(window(raw)))
        .unwrap_err();
    assert!(matches!(err, Error::BadParamsType { .. }));
}

#[test]
fn test_additional_data_reaches_page() {
    let page_type = customize::customize(
        &PAGE,
        [additional_fields([AdditionalField::required(
            "source",
            FieldType::String,
        )])],
    )
    .unwrap();

    let page = Flow::<u32>::new(&[ParamsShape::LimitOffset])
        .params(page_params(1, 2).unwrap())
        .page_type(&page_type)
        .additional_data("source", "primary")
        .paginate(|| Ok(95), |raw| Ok(window(raw)))
        .unwrap();
    assert_eq!(page.extra("source"), Some(&json!("primary")));
}

#[test]
fn test_paginate_cursor() {
    let page = Flow::<u32>::new(&[ParamsShape::Cursor])
        .params(cursor_params(None, 10).unwrap())
        .paginate_cursor(|raw| {
            assert_eq!(raw.cursor, None);
            Ok(CursorPageData::new(numbers(0..10), Some(b"10".to_vec())).with_total(Some(95)))
        })
        .unwrap();

    assert_eq!(page.page_type().id(), CURSOR_PAGE.id());
    assert_eq!(page.items(), numbers(0..10).as_slice());
    assert_eq!(page.meta().next_page.as_deref(), Some("MTA%3D"));
    assert_eq!(page.meta().previous_page, None);
    // totals are off for cursor params by default
    assert_eq!(page.total(), None);
}

// ============================================================================
// Async flow
// ============================================================================

#[tokio::test]
async fn test_apaginate() {
    let page = Flow::<u32>::new(&[ParamsShape::LimitOffset])
        .params(page_params(3, 10).unwrap())
        .apaginate(
            || async { Ok(95) },
            |raw| async move { Ok(window(raw)) },
        )
        .await
        .unwrap();

    assert_eq!(page.items(), numbers(20..30).as_slice());
    assert_eq!(page.total(), Some(95));
}

#[tokio::test]
async fn test_apaginate_awaits_async_transformer() {
    let page = Flow::<u32>::new(&[ParamsShape::LimitOffset])
        .params(page_params(1, 3).unwrap())
        .async_transformer(|items: Vec<u32>| async move {
            tokio::task::yield_now().await;
            items.into_iter().map(|n| n * 100).collect::<Vec<u32>>()
        })
        .apaginate(
            || async { Ok(95) },
            |raw| async move { Ok(window(raw)) },
        )
        .await
        .unwrap();
    assert_eq!(page.items(), &[0, 100, 200]);
}

#[tokio::test]
async fn test_apaginate_uses_context() {
    let ctx = Arc::new(PaginationContext::new());
    let _params = ctx.set_params(limit_offset_params(4, 8).unwrap());
    let _page = ctx.set_page_type(Arc::clone(&LIMIT_OFFSET_PAGE));

    let page = context::scope(Arc::clone(&ctx), async {
        Flow::<u32>::new(&[ParamsShape::LimitOffset])
            .apaginate(
                || async { Ok(95) },
                |raw| async move { Ok(window(raw)) },
            )
            .await
    })
    .await
    .unwrap();

    assert_eq!(page.items(), &[8, 9, 10, 11]);
    assert_eq!(page.meta().limit, Some(4));
}

#[tokio::test]
async fn test_apaginate_without_total_skips_count() {
    let page_type = customize::customize(&LIMIT_OFFSET_PAGE, [include_total(false)]).unwrap();
    let params = page_type
        .params()
        .instantiate(object(json!({ "limit": 10, "offset": 0 })))
        .unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let spy = Arc::clone(&calls);

    let page = Flow::<u32>::new(&[ParamsShape::LimitOffset])
        .params(params)
        .page_type(&page_type)
        .apaginate(
            move || async move {
                spy.fetch_add(1, Ordering::SeqCst);
                Ok(95)
            },
            |raw| async move { Ok(window(raw)) },
        )
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(page.total(), None);
}

#[tokio::test]
async fn test_apaginate_cursor_with_previous() {
    let params = cursor_params(Some("MTA%3D"), 10).unwrap();
    let page = Flow::<u32>::new(&[ParamsShape::Cursor])
        .params(params)
        .apaginate_cursor(|raw| async move {
            assert_eq!(raw.cursor_str(), Some("10"));
            Ok(CursorPageData::new(numbers(10..20), Some(b"20".to_vec()))
                .with_previous(Some(b"0".to_vec())))
        })
        .await
        .unwrap();

    assert_eq!(page.meta().current_page.as_deref(), Some("MTA%3D"));
    assert_eq!(page.meta().next_page.as_deref(), Some("MjA%3D"));
    assert_eq!(page.meta().previous_page.as_deref(), Some("MA%3D%3D"));
}

// ============================================================================
// Sources
// ============================================================================

struct Numbers {
    counted: AtomicUsize,
}

#[async_trait]
impl LimitOffsetSource<u32> for Numbers {
    async fn count(&self) -> anyhow::Result<u64> {
        self.counted.fetch_add(1, Ordering::SeqCst);
        Ok(95)
    }

    async fn fetch(&self, raw: RawParams) -> anyhow::Result<Vec<u32>> {
        Ok(window(raw))
    }
}

#[async_trait]
impl CursorSource<u32> for Numbers {
    async fn fetch(&self, raw: CursorRawParams) -> anyhow::Result<CursorPageData<u32>> {
        let start: u32 = raw.cursor_str().unwrap_or("0").parse()?;
        let size = raw.size.unwrap_or(10) as u32;
        let end = (start + size).min(95);
        let next = (end < 95).then(|| end.to_string().into_bytes());
        Ok(CursorPageData::new(numbers(start..end), next))
    }
}

#[tokio::test]
async fn test_apaginate_source() {
    let source = Numbers {
        counted: AtomicUsize::new(0),
    };
    let page = Flow::<u32>::new(&[ParamsShape::LimitOffset])
        .params(page_params(10, 10).unwrap())
        .apaginate_source(&source)
        .await
        .unwrap();

    assert_eq!(page.items(), numbers(90..95).as_slice());
    assert_eq!(source.counted.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_apaginate_cursor_source_last_page() {
    let source = Numbers {
        counted: AtomicUsize::new(0),
    };
    let page = Flow::<u32>::new(&[ParamsShape::Cursor])
        .params(cursor_params(Some("OTA%3D"), 10).unwrap())
        .apaginate_cursor_source(&source)
        .await
        .unwrap();

    assert_eq!(page.items(), numbers(90..95).as_slice());
    assert_eq!(page.meta().next_page, None);
}
