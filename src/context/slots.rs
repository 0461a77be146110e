//! Context slots, guards, and the per-request handles

use crate::error::{Error, Result};
use crate::page::PageType;
use crate::params::Params;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

// ============================================================================
// Slot
// ============================================================================

/// A single named, resettable context slot
pub struct Slot<T> {
    name: &'static str,
    value: RwLock<Option<T>>,
}

impl<T> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("name", &self.name)
            .field("is_set", &self.is_set())
            .finish()
    }
}

impl<T> Slot<T> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            value: RwLock::new(None),
        }
    }

    /// Slot name, used in error messages
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the slot currently holds a value
    pub fn is_set(&self) -> bool {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn replace(&self, value: Option<T>) -> Option<T> {
        let mut guard = self.value.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, value)
    }

    /// Set the slot; the returned guard restores the previous value on drop
    pub fn set(&self, value: T) -> SlotGuard<'_, T> {
        let previous = self.replace(Some(value));
        tracing::trace!(slot = self.name, "context slot set");
        SlotGuard {
            slot: self,
            previous: Some(previous),
        }
    }
}

impl<T: Clone> Slot<T> {
    /// Read the slot, failing when it was never set
    pub fn get(&self) -> Result<T> {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| Error::uninitialized(self.name))
    }
}

/// Reset token returned by [`Slot::set`]
#[must_use = "dropping the guard immediately resets the slot"]
pub struct SlotGuard<'a, T> {
    slot: &'a Slot<T>,
    previous: Option<Option<T>>,
}

impl<T> SlotGuard<'_, T> {
    /// Keep the new value after the guard goes away
    pub fn persist(mut self) {
        self.previous = None;
    }
}

impl<T> Drop for SlotGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.slot.replace(previous);
            tracing::trace!(slot = self.slot.name, "context slot reset");
        }
    }
}

// ============================================================================
// Response Handle
// ============================================================================

/// Shared handle to response parts written during a request
///
/// Headers and status set through the handle are applied to the final
/// response by the route middleware.
#[derive(Debug, Clone, Default)]
pub struct ResponseHandle {
    headers: Arc<Mutex<HeaderMap>>,
    status: Arc<Mutex<Option<StatusCode>>>,
}

impl ResponseHandle {
    /// Create an empty handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a header
    pub fn insert_header(&self, name: HeaderName, value: HeaderValue) {
        self.headers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value);
    }

    /// Merge headers, replacing existing values
    pub fn extend_headers(&self, headers: HeaderMap) {
        self.headers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(headers);
    }

    /// Snapshot of the headers written so far
    pub fn headers(&self) -> HeaderMap {
        self.headers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Override the response status
    pub fn set_status(&self, status: StatusCode) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = Some(status);
    }

    /// Status override, if any
    pub fn status(&self) -> Option<StatusCode> {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply the collected parts to a response
    pub fn apply(&self, response: &mut axum::response::Response) {
        if let Some(status) = self.status() {
            *response.status_mut() = status;
        }
        response.headers_mut().extend(self.headers());
    }
}

// ============================================================================
// Request Info
// ============================================================================

/// Request line of the request being served
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    /// Request method
    pub method: Method,
    /// Request URI
    pub uri: Uri,
}

impl RequestInfo {
    /// Create request info
    pub fn new(method: Method, uri: Uri) -> Self {
        Self { method, uri }
    }

    /// Path plus query, as used for links
    pub fn path_and_query(&self) -> String {
        self.uri
            .path_and_query()
            .map_or_else(|| self.uri.path().to_string(), ToString::to_string)
    }
}

// ============================================================================
// Context
// ============================================================================

/// The ambient slots of one request
#[derive(Debug)]
pub struct PaginationContext {
    params: Slot<Params>,
    response: Slot<ResponseHandle>,
    page_type: Slot<Arc<PageType>>,
    request: Slot<RequestInfo>,
}

impl Default for PaginationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PaginationContext {
    /// Create a context with every slot unset
    pub fn new() -> Self {
        Self {
            params: Slot::new("params"),
            response: Slot::new("response"),
            page_type: Slot::new("page_type"),
            request: Slot::new("request"),
        }
    }

    /// Bound params slot
    pub fn params(&self) -> &Slot<Params> {
        &self.params
    }

    /// Response handle slot
    pub fn response(&self) -> &Slot<ResponseHandle> {
        &self.response
    }

    /// Current page type slot
    pub fn page_type(&self) -> &Slot<Arc<PageType>> {
        &self.page_type
    }

    /// Request line slot
    pub fn request(&self) -> &Slot<RequestInfo> {
        &self.request
    }

    /// Bind params for the rest of the request
    pub fn set_params(&self, params: Params) -> SlotGuard<'_, Params> {
        self.params.set(params)
    }

    /// Install a response handle
    pub fn set_response(&self, handle: ResponseHandle) -> SlotGuard<'_, ResponseHandle> {
        self.response.set(handle)
    }

    /// Set the current page type
    pub fn set_page_type(&self, page_type: Arc<PageType>) -> SlotGuard<'_, Arc<PageType>> {
        self.page_type.set(page_type)
    }

    /// Record the request line
    pub fn set_request(&self, request: RequestInfo) -> SlotGuard<'_, RequestInfo> {
        self.request.set(request)
    }
}
