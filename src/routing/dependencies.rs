//! Per-route dependencies and the middleware that runs them

use crate::context::{self, PaginationContext, RequestInfo, ResponseHandle};
use crate::error::Result;
use crate::page::PageType;
use crate::params::{Params, ParamsSpec};
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::fmt;
use std::sync::Arc;

/// A step executed before the handler of a route
#[derive(Clone)]
pub enum Dependency {
    /// Marks the route as already installed
    PaginationMarker,
    /// Installs a response handle into the context
    CaptureResponse,
    /// Binds params from the query string into the context
    BindParams(Arc<ParamsSpec>),
    /// Sets the current page type in the context
    SetCurrentPage(Arc<PageType>),
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PaginationMarker => f.write_str("PaginationMarker"),
            Self::CaptureResponse => f.write_str("CaptureResponse"),
            Self::BindParams(spec) => f.debug_tuple("BindParams").field(&spec.name()).finish(),
            Self::SetCurrentPage(page) => {
                f.debug_tuple("SetCurrentPage").field(&page.name()).finish()
            }
        }
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::PaginationMarker, Self::PaginationMarker)
            | (Self::CaptureResponse, Self::CaptureResponse) => true,
            (Self::BindParams(a), Self::BindParams(b)) => a.id() == b.id(),
            (Self::SetCurrentPage(a), Self::SetCurrentPage(b)) => a.id() == b.id(),
            _ => false,
        }
    }
}

/// Bind params and decode the cursor up front so bad input fails as 400
fn bind_params(spec: &Arc<ParamsSpec>, query: Option<&str>) -> Result<Params> {
    let params = spec.bind_query(query)?;
    params.to_raw_params()?;
    Ok(params)
}

/// Run the route's dependencies, then the handler inside the context scope
pub(crate) async fn pagination_middleware(
    dependencies: Arc<[Dependency]>,
    request: Request,
    next: Next,
) -> Response {
    let ctx = Arc::new(PaginationContext::new());
    let handle = ResponseHandle::new();

    let request_guard = ctx.set_request(RequestInfo::new(
        request.method().clone(),
        request.uri().clone(),
    ));
    let mut response_guard = None;
    let mut params_guard = None;
    let mut page_guard = None;

    for dependency in dependencies.iter() {
        match dependency {
            Dependency::PaginationMarker => {}
            Dependency::CaptureResponse => {
                response_guard = Some(ctx.set_response(handle.clone()));
            }
            Dependency::BindParams(spec) => match bind_params(spec, request.uri().query()) {
                Ok(params) => params_guard = Some(ctx.set_params(params)),
                Err(err) => {
                    tracing::debug!(
                        uri = %request.uri(),
                        error = %err,
                        "rejecting pagination params"
                    );
                    return err.into_response();
                }
            },
            Dependency::SetCurrentPage(page) => {
                page_guard = Some(ctx.set_page_type(Arc::clone(page)));
            }
        }
    }

    let mut response = context::scope(Arc::clone(&ctx), next.run(request)).await;
    if response_guard.is_some() {
        handle.apply(&mut response);
    }

    drop(page_guard);
    drop(params_guard);
    drop(response_guard);
    drop(request_guard);
    response
}
