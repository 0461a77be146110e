//! Page module
//!
//! Page types, the page envelope and page construction.
//!
//! # Overview
//!
//! A [`PageType`] is the runtime descriptor of a page "class": its shape,
//! the params it consumes, field aliases, exclusions and additional fields.
//! [`PageType::create`] turns fetched items plus bound params into a
//! [`Page<T>`], which serializes to the wire shape of its type.
//!
//! Built-in shapes:
//! - page/size ([`PAGE`], [`LINKS_PAGE`])
//! - limit/offset ([`LIMIT_OFFSET_PAGE`], [`LIMIT_OFFSET_LINKS_PAGE`])
//! - cursor ([`CURSOR_PAGE`])

mod builtin;
mod envelope;
mod links;
mod page_type;
mod schema;
mod types;

pub use builtin::{
    default_page_for, CURSOR_PAGE, LIMIT_OFFSET_LINKS_PAGE, LIMIT_OFFSET_PAGE, LINKS_PAGE, PAGE,
};
pub use envelope::Page;
pub use links::{limit_offset_links, page_size_links, update_path};
pub use page_type::PageType;
pub use types::{
    AdditionalField, FieldType, HeadersHook, Links, ModelConfig, PageExtras, PageKind, PageMeta,
};
