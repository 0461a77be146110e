//! Integration tests through the axum router
//!
//! Tests the full request flow: query string → installed dependencies →
//! handler → adapter → page envelope

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use pagewise::adapters::sequence;
use pagewise::customize::{field_aliases, include_total, rename};
use pagewise::flow::Flow;
use pagewise::page::{LINKS_PAGE, LIMIT_OFFSET_PAGE};
use pagewise::params::{ParamsShape, CURSOR_PARAMS};
use pagewise::{context, customize, install_pagination, ApiRouter, JsonValue, Page, Result};
use pagewise::{CURSOR_PAGE, PAGE};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn numbers(n: u32) -> Vec<u32> {
    (0..n).collect()
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, JsonValue) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn app(mut api: ApiRouter) -> Router {
    install_pagination(&mut api);
    api.into_router()
}

// ============================================================================
// Handlers
// ============================================================================

async fn hundred() -> Result<Page<u32>> {
    sequence::paginate(&numbers(100))
}

async fn twenty_three() -> Result<Page<u32>> {
    sequence::paginate(&numbers(23))
}

async fn twenty_two_by_cursor() -> Result<Page<u32>> {
    sequence::paginate_cursor(&numbers(22))
}

async fn thirty_five() -> Result<Page<u32>> {
    sequence::paginate(&numbers(35))
}

static COUNT_CALLS: AtomicUsize = AtomicUsize::new(0);

async fn counted() -> Result<Page<u32>> {
    let all = numbers(100);
    let items = all.as_slice();
    Flow::new(&[ParamsShape::LimitOffset])
        .apaginate(
            move || async move {
                COUNT_CALLS.fetch_add(1, Ordering::SeqCst);
                Ok(items.len() as u64)
            },
            move |raw| async move { Ok(items[raw.as_range(items.len())].to_vec()) },
        )
        .await
}

async fn from_spawned_task() -> Result<Page<u32>> {
    context::spawn(async { sequence::paginate(&numbers(100)) })
        .await
        .map_err(|e| pagewise::Error::Other(e.to_string()))?
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[tokio::test]
async fn test_page_size_happy_path() {
    init_tracing();
    let router = app(ApiRouter::new().paginated("/items", get(hundred), &PAGE));

    let (status, body) = get_json(router, "/items?page=2&size=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "items": (10..20).collect::<Vec<u32>>(),
            "total": 100,
            "page": 2,
            "size": 10,
            "pages": 10
        })
    );
}

#[tokio::test]
async fn test_limit_offset_last_partial_page() {
    let router = app(ApiRouter::new().paginated("/items", get(twenty_three), &LIMIT_OFFSET_PAGE));

    let (status, body) = get_json(router, "/items?limit=10&offset=20").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "items": [20, 21, 22], "total": 23, "limit": 10, "offset": 20 })
    );
}

#[tokio::test]
async fn test_cursor_round_trip() {
    let router = app(ApiRouter::new().paginated("/items", get(twenty_two_by_cursor), &CURSOR_PAGE));

    let mut uri = "/items?size=10".to_string();
    let mut lengths = Vec::new();
    let mut tokens = Vec::new();
    loop {
        let (status, body) = get_json(router.clone(), &uri).await;
        assert_eq!(status, StatusCode::OK);
        lengths.push(body["items"].as_array().unwrap().len());

        let Some(next) = body["next_page"].as_str() else {
            break;
        };
        let native = CURSOR_PARAMS
            .codec()
            .decode_wire(Some(next), true)
            .unwrap()
            .unwrap();
        tokens.push(String::from_utf8(native).unwrap());
        uri = format!("/items?size=10&cursor={next}");
    }

    assert_eq!(lengths, vec![10, 10, 2]);
    assert_eq!(tokens, vec!["10", "20"]);
}

#[tokio::test]
async fn test_customized_page_renames_field() {
    let my_page = customize(&PAGE, [rename("MyPage"), field_aliases([("total", "count")])]).unwrap();
    let mut api = ApiRouter::new().paginated("/items", get(hundred), &my_page);
    install_pagination(&mut api);

    let doc = api.openapi("Items", "1.0.0");
    assert_eq!(doc["components"]["schemas"]["MyPage"]["title"], json!("MyPage"));

    let (status, body) = get_json(api.into_router(), "/items").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(100));
    assert_eq!(body["page"], json!(1));
    assert_eq!(body["size"], json!(50));
    assert_eq!(body["pages"], json!(2));
    assert!(body.get("total").is_none());
    assert_eq!(body["items"].as_array().unwrap().len(), 50);
}

#[tokio::test]
async fn test_include_total_off_skips_count() {
    let page = customize(&PAGE, [include_total(false)]).unwrap();
    let router = app(ApiRouter::new().paginated("/items", get(counted), &page));

    let (status, body) = get_json(router, "/items?page=1&size=10").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("total").map_or(true, JsonValue::is_null));
    assert_eq!(body["items"].as_array().unwrap().len(), 10);
    assert_eq!(COUNT_CALLS.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_cursor_is_bad_request() {
    let router = app(ApiRouter::new().paginated("/items", get(twenty_two_by_cursor), &CURSOR_PAGE));

    let (status, body) = get_json(router, "/items?cursor=not-base64").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "detail": "Invalid cursor value" }));
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test]
async fn test_nested_router_install_order_does_not_matter() {
    let mut inner = ApiRouter::new().paginated("/items", get(hundred), &PAGE);
    install_pagination(&mut inner);
    let mut api = ApiRouter::new().nest("/v1", inner);
    assert_eq!(install_pagination(&mut api), 0);

    let (status, body) = get_json(api.into_router(), "/v1/items?page=3&size=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0], json!(20));
}

#[tokio::test]
async fn test_links_keep_other_query_params() {
    let router = app(ApiRouter::new().paginated("/items", get(thirty_five), &LINKS_PAGE));

    let (status, body) = get_json(router, "/items?q=x&page=2&size=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["links"],
        json!({
            "first": "/items?q=x&page=1&size=10",
            "last": "/items?q=x&page=4&size=10",
            "self": "/items?q=x&page=2&size=10",
            "next": "/items?q=x&page=3&size=10",
            "prev": "/items?q=x&page=1&size=10"
        })
    );
}

#[tokio::test]
async fn test_spawned_task_inherits_context() {
    let router = app(ApiRouter::new().paginated("/items", get(from_spawned_task), &PAGE));

    let (status, body) = get_json(router, "/items?page=2&size=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([5, 6, 7, 8, 9]));
}

#[tokio::test]
async fn test_served_over_tcp() {
    init_tracing();
    let router = app(ApiRouter::new().paginated("/items", get(hundred), &PAGE));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    let response = reqwest::get(format!("http://{addr}/items?page=5&size=20"))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: JsonValue = response.json().await.unwrap();
    assert_eq!(body["items"][0], json!(80));
    assert_eq!(body["pages"], json!(5));

    let response = reqwest::get(format!("http://{addr}/items?page=0"))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_page_past_the_end_is_bad_request() {
    let router = app(ApiRouter::new().paginated("/items", get(hundred), &PAGE));

    let (status, body) = get_json(router.clone(), "/items?page=10&size=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pages"], json!(10));

    let (status, body) = get_json(router, "/items?page=11&size=10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"][0]["loc"], json!(["query", "page"]));
}

// ============================================================================
// Outside of a request
// ============================================================================

#[test]
fn test_flow_outside_request_needs_explicit_params() {
    let all = numbers(10);
    let items = &all;
    let result = tokio_test::block_on(
        Flow::new(&[ParamsShape::LimitOffset])
            .apaginate(|| async { Ok(10) }, move |_| async move { Ok(items.clone()) }),
    );
    tokio_test::assert_err!(&result);
    assert!(matches!(
        result,
        Err(pagewise::Error::UninitializedPage { .. })
    ));

    let explicit = pagewise::params::page_params(1, 5).unwrap();
    let page = tokio_test::block_on(
        Flow::new(&[ParamsShape::LimitOffset])
            .params(explicit)
            .apaginate(|| async { Ok(10) }, |raw| async move {
                Ok(numbers(10)[raw.as_range(10)].to_vec())
            }),
    );
    let page = tokio_test::assert_ok!(page);
    assert_eq!(page.items(), &[0, 1, 2, 3, 4]);
}
