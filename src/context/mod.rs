//! Request-scoped pagination context
//!
//! Four ambient slots live for the duration of one request: the bound
//! params, a response handle, the current page type and the incoming request
//! line. The route middleware installed by
//! [`install_pagination`](crate::routing::install_pagination) fills them
//! before the handler runs; handlers and the paginator flow read them.
//!
//! # Overview
//!
//! - Storage is a `tokio::task_local!`, so concurrent requests never see each
//!   other's slots.
//! - [`spawn`] and [`spawn_blocking`] carry the context into child tasks and
//!   blocking threads.
//! - Slot writers return a [`SlotGuard`] that restores the previous value when
//!   dropped, on every exit path.

mod slots;

pub use slots::{PaginationContext, RequestInfo, ResponseHandle, Slot, SlotGuard};

use crate::error::{Error, Result};
use crate::page::PageType;
use crate::params::Params;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

tokio::task_local! {
    static CONTEXT: Arc<PaginationContext>;
}

/// Context of the current task, if one is in scope
pub fn current() -> Option<Arc<PaginationContext>> {
    CONTEXT.try_with(Arc::clone).ok()
}

fn with_context<R>(
    slot: &'static str,
    f: impl FnOnce(&PaginationContext) -> Result<R>,
) -> Result<R> {
    CONTEXT
        .try_with(|ctx| f(ctx))
        .map_err(|_| Error::uninitialized(slot))?
}

/// Return `explicit` if given, otherwise the params bound for this request
pub fn resolve_params(explicit: Option<Params>) -> Result<Params> {
    match explicit {
        Some(params) => Ok(params),
        None => with_context("params", |ctx| ctx.params().get()),
    }
}

/// Response handle of the current request
pub fn response() -> Result<ResponseHandle> {
    with_context("response", |ctx| ctx.response().get())
}

/// Page type declared by the current route
pub fn current_page() -> Result<Arc<PageType>> {
    with_context("page_type", |ctx| ctx.page_type().get())
}

/// Request line of the current request
pub fn request() -> Result<RequestInfo> {
    with_context("request", |ctx| ctx.request().get())
}

/// Run a future with `ctx` as the ambient context
pub async fn scope<F: Future>(ctx: Arc<PaginationContext>, fut: F) -> F::Output {
    CONTEXT.scope(ctx, fut).await
}

/// Run a closure with `ctx` as the ambient context
pub fn sync_scope<R>(ctx: Arc<PaginationContext>, f: impl FnOnce() -> R) -> R {
    CONTEXT.sync_scope(ctx, f)
}

/// Spawn a task that inherits the current context
pub fn spawn<F>(fut: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    match current() {
        Some(ctx) => tokio::spawn(CONTEXT.scope(ctx, fut)),
        None => tokio::spawn(fut),
    }
}

/// Run blocking work on the thread pool, inheriting the current context
pub fn spawn_blocking<F, R>(f: F) -> JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    match current() {
        Some(ctx) => tokio::task::spawn_blocking(move || CONTEXT.sync_scope(ctx, f)),
        None => tokio::task::spawn_blocking(f),
    }
}
