//! In-memory sequence adapter
//!
//! Paginates a slice. Limit/offset pagination slices by window, cursor
//! pagination uses the decimal offset as its native continuation token.

use crate::error::{Error, Result};
use crate::flow::{CursorPageData, Flow};
use crate::page::Page;
use crate::params::{CursorRawParams, ParamsShape};

/// Paginate a slice with the request params
pub fn paginate<T: Clone + 'static>(items: &[T]) -> Result<Page<T>> {
    paginate_with(Flow::new(&[ParamsShape::LimitOffset]), items)
}

/// Paginate a slice with a configured flow
pub fn paginate_with<T: Clone, U>(flow: Flow<T, U>, items: &[T]) -> Result<Page<U>> {
    flow.paginate(
        || Ok(items.len() as u64),
        |raw| Ok(items[raw.as_range(items.len())].to_vec()),
    )
}

/// Paginate a slice by continuation token
pub fn paginate_cursor<T: Clone + 'static>(items: &[T]) -> Result<Page<T>> {
    paginate_cursor_with(Flow::new(&[ParamsShape::Cursor]), items)
}

/// Paginate a slice by continuation token with a configured flow
pub fn paginate_cursor_with<T: Clone, U>(flow: Flow<T, U>, items: &[T]) -> Result<Page<U>> {
    flow.paginate_cursor(|raw| cursor_window(items, &raw).map_err(anyhow::Error::from))
}

fn cursor_window<T: Clone>(items: &[T], raw: &CursorRawParams) -> Result<CursorPageData<T>> {
    let start = match raw.cursor_str() {
        None => 0,
        Some(token) => token
            .parse::<usize>()
            .map_err(|e| Error::invalid_cursor(format!("bad offset token '{token}': {e}")))?,
    };
    let start = start.min(items.len());
    let size = raw
        .size
        .map_or(items.len(), |size| usize::try_from(size).unwrap_or(usize::MAX));
    let end = start.saturating_add(size).min(items.len());

    // a zero-size window would hand back the current token
    let next = (end > start && end < items.len()).then(|| offset_token(end));
    let previous = (start > 0 && size > 0).then(|| offset_token(start.saturating_sub(size)));

    Ok(CursorPageData::new(items[start..end].to_vec(), next)
        .with_previous(previous)
        .with_total(Some(items.len() as u64)))
}

fn offset_token(offset: usize) -> Vec<u8> {
    offset.to_string().into_bytes()
}
