//! Routing module
//!
//! Registers routes together with their response model and rewrites page
//! routes so pagination params are bound before the handler runs.
//!
//! # Overview
//!
//! ```text
//! ApiRouter::paginated("/items", get(handler), &PAGE)
//!        │
//!        ▼  install_pagination
//! [marker, capture response, bind params, set current page]
//!        │
//!        ▼  into_router
//! axum::Router ── middleware: run dependencies ─▶ handler in context scope
//! ```
//!
//! Handlers on installed routes can call [`crate::flow`] operations or
//! [`PageType::create`](crate::page::PageType::create) without passing
//! params explicitly.

mod dependencies;
mod install;
mod openapi;
mod router;

pub use dependencies::Dependency;
pub use install::install_pagination;
pub use router::{ApiRouter, ResponseModel, RouteEntry};
