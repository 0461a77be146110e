//! Items transformers

use crate::error::{Error, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Synchronous transformer function
pub type SyncTransformFn<T, U> = Arc<dyn Fn(Vec<T>) -> Vec<U> + Send + Sync>;

/// Asynchronous transformer function
pub type AsyncTransformFn<T, U> = Arc<dyn Fn(Vec<T>) -> BoxFuture<'static, Vec<U>> + Send + Sync>;

/// Function applied to fetched items before the page is built
pub enum ItemsTransformer<T, U> {
    /// Runs inline
    Sync(SyncTransformFn<T, U>),
    /// Awaited by the async flow, rejected by the sync flow
    Async(AsyncTransformFn<T, U>),
}

impl<T, U> Clone for ItemsTransformer<T, U> {
    fn clone(&self) -> Self {
        match self {
            Self::Sync(f) => Self::Sync(Arc::clone(f)),
            Self::Async(f) => Self::Async(Arc::clone(f)),
        }
    }
}

impl<T, U> fmt::Debug for ItemsTransformer<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("ItemsTransformer::Sync"),
            Self::Async(_) => f.write_str("ItemsTransformer::Async"),
        }
    }
}

impl<T: 'static> ItemsTransformer<T, T> {
    /// Pass items through unchanged
    pub fn identity() -> Self {
        Self::Sync(Arc::new(|items| items))
    }
}

impl<T, U> ItemsTransformer<T, U> {
    /// Wrap a synchronous function
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(Vec<T>) -> Vec<U> + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(f))
    }

    /// Wrap an asynchronous function
    pub fn asynchronous<F, Fut>(f: F) -> Self
    where
        F: Fn(Vec<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Vec<U>> + Send + 'static,
    {
        Self::Async(Arc::new(move |items| f(items).boxed()))
    }

    /// Whether this transformer must be awaited
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }

    /// Apply in the sync flow
    pub fn apply_sync(&self, items: Vec<T>) -> Result<Vec<U>> {
        match self {
            Self::Sync(f) => Ok(f(items)),
            Self::Async(_) => Err(Error::AsyncTransformer),
        }
    }

    /// Apply in the async flow
    pub async fn apply(&self, items: Vec<T>) -> Vec<U> {
        match self {
            Self::Sync(f) => f(items),
            Self::Async(f) => f(items).await,
        }
    }
}
