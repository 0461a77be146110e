//! Generic paginator flow
//!
//! Every backend adapter performs the same procedure:
//!
//! ```text
//! resolve params ──▶ check raw shape against the adapter's accepted shapes
//!        │
//!        ▼
//! include_total? ──▶ count()
//!        │
//!        ▼
//! fetch(raw) ──▶ truncate over-fetch ──▶ transform items ──▶ PageType::create
//! ```
//!
//! [`Flow`] holds the per-call options. The sync and async terminal
//! operations differ only in how they call `count` and `fetch`.
//!
//! # Example
//!
//! ```ignore
//! use pagewise::flow::Flow;
//! use pagewise::params::ParamsShape;
//!
//! let page = Flow::<User>::new(&[ParamsShape::LimitOffset])
//!     .apaginate(
//!         || async { Ok(repo.count().await?) },
//!         |raw| async move { Ok(repo.list(raw.limit, raw.offset).await?) },
//!     )
//!     .await?;
//! ```

mod source;
mod transformer;

pub use source::{CursorPageData, CursorSource, LimitOffsetSource};
pub use transformer::{AsyncTransformFn, ItemsTransformer, SyncTransformFn};

use crate::context;
use crate::error::{Error, Result};
use crate::page::{default_page_for, Page, PageExtras, PageType};
use crate::params::{AnyRawParams, CursorRawParams, Params, ParamsShape, RawParams};
use crate::types::{JsonObject, JsonValue};
use std::future::Future;
use std::sync::Arc;

/// Options of a single pagination call
///
/// `T` is the item type the adapter fetches, `U` the item type of the
/// resulting page. They differ only when a transformer is set.
#[derive(Debug, Clone)]
pub struct Flow<T, U = T> {
    accepted: Vec<ParamsShape>,
    params: Option<Params>,
    page_type: Option<Arc<PageType>>,
    transformer: ItemsTransformer<T, U>,
    additional: JsonObject,
}

impl<T: 'static> Flow<T, T> {
    /// Create a flow for an adapter accepting the given raw shapes
    pub fn new(accepted: &[ParamsShape]) -> Self {
        Self {
            accepted: accepted.to_vec(),
            params: None,
            page_type: None,
            transformer: ItemsTransformer::identity(),
            additional: JsonObject::new(),
        }
    }
}

impl<T, U> Flow<T, U> {
    /// Use these params instead of the request-bound ones
    #[must_use]
    pub fn params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    /// Use this page type instead of the route's current page
    #[must_use]
    pub fn page_type(mut self, page_type: &Arc<PageType>) -> Self {
        self.page_type = Some(Arc::clone(page_type));
        self
    }

    /// Set an additional field value passed through to `create`
    #[must_use]
    pub fn additional_data(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.additional.insert(name.into(), value.into());
        self
    }

    /// Transform fetched items with a synchronous function
    pub fn transformer<V, F>(self, f: F) -> Flow<T, V>
    where
        F: Fn(Vec<T>) -> Vec<V> + Send + Sync + 'static,
    {
        self.with_transformer(ItemsTransformer::sync(f))
    }

    /// Transform fetched items with an asynchronous function
    ///
    /// Only the async terminal operations accept this.
    pub fn async_transformer<V, F, Fut>(self, f: F) -> Flow<T, V>
    where
        F: Fn(Vec<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Vec<V>> + Send + 'static,
    {
        self.with_transformer(ItemsTransformer::asynchronous(f))
    }

    /// Replace the transformer
    pub fn with_transformer<V>(self, transformer: ItemsTransformer<T, V>) -> Flow<T, V> {
        Flow {
            accepted: self.accepted,
            params: self.params,
            page_type: self.page_type,
            transformer,
            additional: self.additional,
        }
    }

    /// Raw shapes this flow accepts
    pub fn accepted(&self) -> &[ParamsShape] {
        &self.accepted
    }

    // ========================================================================
    // Sync terminal operations
    // ========================================================================

    /// Paginate with synchronous `count` and `fetch` callables
    ///
    /// `count` is not called when the params disable totals.
    pub fn paginate<C, F>(self, count: C, fetch: F) -> Result<Page<U>>
    where
        C: FnOnce() -> anyhow::Result<u64>,
        F: FnOnce(RawParams) -> anyhow::Result<Vec<T>>,
    {
        if self.transformer.is_async() {
            return Err(Error::AsyncTransformer);
        }
        let (params, page_type, raw) = self.resolve_limit_offset()?;

        let total = if raw.include_total {
            Some(count().map_err(adapter_error)?)
        } else {
            None
        };
        let mut items = fetch(raw).map_err(adapter_error)?;
        truncate(&mut items, raw.limit);

        let items = self.transformer.apply_sync(items)?;
        page_type.create(items, &params, total, self.extras())
    }

    /// Paginate by continuation token with a synchronous `fetch`
    pub fn paginate_cursor<F>(self, fetch: F) -> Result<Page<U>>
    where
        F: FnOnce(CursorRawParams) -> anyhow::Result<CursorPageData<T>>,
    {
        if self.transformer.is_async() {
            return Err(Error::AsyncTransformer);
        }
        let (params, page_type, raw) = self.resolve_cursor()?;
        let (size, include_total) = (raw.size, raw.include_total);

        let mut data = fetch(raw).map_err(adapter_error)?;
        truncate(&mut data.items, size);

        let items = self.transformer.apply_sync(std::mem::take(&mut data.items))?;
        let total = data.total.filter(|_| include_total);
        page_type.create(items, &params, total, self.cursor_extras(data))
    }

    // ========================================================================
    // Async terminal operations
    // ========================================================================

    /// Paginate with asynchronous `count` and `fetch` callables
    pub async fn apaginate<C, CF, F, FF>(self, count: C, fetch: F) -> Result<Page<U>>
    where
        C: FnOnce() -> CF,
        CF: Future<Output = anyhow::Result<u64>>,
        F: FnOnce(RawParams) -> FF,
        FF: Future<Output = anyhow::Result<Vec<T>>>,
    {
        let (params, page_type, raw) = self.resolve_limit_offset()?;

        let total = if raw.include_total {
            Some(count().await.map_err(adapter_error)?)
        } else {
            None
        };
        let mut items = fetch(raw).await.map_err(adapter_error)?;
        truncate(&mut items, raw.limit);

        let items = self.transformer.apply(items).await;
        page_type.create(items, &params, total, self.extras())
    }

    /// Paginate by continuation token with an asynchronous `fetch`
    pub async fn apaginate_cursor<F, FF>(self, fetch: F) -> Result<Page<U>>
    where
        F: FnOnce(CursorRawParams) -> FF,
        FF: Future<Output = anyhow::Result<CursorPageData<T>>>,
    {
        let (params, page_type, raw) = self.resolve_cursor()?;
        let (size, include_total) = (raw.size, raw.include_total);

        let mut data = fetch(raw).await.map_err(adapter_error)?;
        truncate(&mut data.items, size);

        let items = self.transformer.apply(std::mem::take(&mut data.items)).await;
        let total = data.total.filter(|_| include_total);
        page_type.create(items, &params, total, self.cursor_extras(data))
    }

    /// Paginate over a [`LimitOffsetSource`]
    pub async fn apaginate_source<S>(self, source: &S) -> Result<Page<U>>
    where
        S: LimitOffsetSource<T> + ?Sized,
    {
        self.apaginate(|| source.count(), |raw| source.fetch(raw))
            .await
    }

    /// Paginate over a [`CursorSource`]
    pub async fn apaginate_cursor_source<S>(self, source: &S) -> Result<Page<U>>
    where
        S: CursorSource<T> + ?Sized,
    {
        self.apaginate_cursor(|raw| source.fetch(raw)).await
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    fn resolve(&self) -> Result<(Params, Arc<PageType>, AnyRawParams)> {
        let explicit = self.params.is_some();
        let params = context::resolve_params(self.params.clone())?;
        let raw = params.to_raw_params()?;
        if !self.accepted.contains(&raw.shape()) {
            return Err(Error::ParamsShapeUnsupported {
                accepted: self.accepted.clone(),
                actual: raw.shape(),
            });
        }

        let page_type = match &self.page_type {
            Some(page_type) => Arc::clone(page_type),
            None => match context::current_page() {
                Ok(page_type) => page_type,
                Err(_) if explicit => default_page_for(params.family()),
                Err(e) => return Err(e),
            },
        };
        Ok((params, page_type, raw))
    }

    fn resolve_limit_offset(&self) -> Result<(Params, Arc<PageType>, RawParams)> {
        match self.resolve()? {
            (params, page_type, AnyRawParams::LimitOffset(raw)) => Ok((params, page_type, raw)),
            (_, _, other) => Err(Error::ParamsShapeUnsupported {
                accepted: self.accepted.clone(),
                actual: other.shape(),
            }),
        }
    }

    fn resolve_cursor(&self) -> Result<(Params, Arc<PageType>, CursorRawParams)> {
        match self.resolve()? {
            (params, page_type, AnyRawParams::Cursor(raw)) => Ok((params, page_type, raw)),
            (_, _, other) => Err(Error::ParamsShapeUnsupported {
                accepted: self.accepted.clone(),
                actual: other.shape(),
            }),
        }
    }

    fn extras(&self) -> PageExtras {
        PageExtras::new().fields(self.additional.clone())
    }

    fn cursor_extras(&self, data: CursorPageData<T>) -> PageExtras {
        self.extras()
            .next(data.next)
            .previous(data.previous)
            .current_backwards(data.current_backwards)
    }
}

/// Adapters may return a crate error through `anyhow`, keep it as is
fn adapter_error(err: anyhow::Error) -> Error {
    match err.downcast::<Error>() {
        Ok(err) => err,
        Err(err) => Error::Adapter(err),
    }
}

fn truncate<T>(items: &mut Vec<T>, limit: Option<u64>) {
    let Some(limit) = limit else {
        return;
    };
    let cap = usize::try_from(limit).unwrap_or(usize::MAX);
    if items.len() > cap {
        tracing::warn!(
            fetched = items.len(),
            limit = cap,
            "adapter returned more items than requested, truncating"
        );
        items.truncate(cap);
    }
}

#[cfg(test)]
mod tests;
