//! Params module
//!
//! Pagination inputs bound from the query string, and their normalized raw
//! forms.
//!
//! # Overview
//!
//! - [`ParamsSpec`] - describes bindable query fields, bounds and constants
//! - [`Params`] - a validated instance bound against a spec
//! - [`AnyRawParams`] - the limit/offset or cursor form backends consume
//!
//! Built-in specs cover page/size, limit/offset and cursor pagination.

mod builtin;
mod spec;
mod types;

pub use builtin::{
    cursor_params, cursor_spec, limit_offset_params, limit_offset_spec, page_params,
    page_size_spec, CURSOR_PARAMS, LIMIT_OFFSET_PARAMS, PAGE_SIZE_PARAMS,
};
pub use spec::{
    FieldKind, ParamField, Params, ParamsSpec, INCLUDE_TOTAL, QUOTED_CURSOR, STR_CURSOR,
};
pub use types::{AnyRawParams, CursorRawParams, ParamsFamily, ParamsShape, RawParams};

#[cfg(test)]
mod tests;
