// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # pagewise
//!
//! Declarative pagination for axum handlers.
//!
//! ## Features
//!
//! - **Page types**: page/size, limit/offset and cursor pages out of the box
//! - **Ambient params**: handlers build pages without threading params around
//! - **Customization**: derive page types by composing modifiers
//! - **Route rewriting**: `install_pagination` binds query params on page routes
//! - **Generic flow**: one procedure shared by every backend adapter
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use axum::routing::get;
//! use pagewise::adapters::sequence;
//! use pagewise::page::{Page, PAGE};
//! use pagewise::routing::{install_pagination, ApiRouter};
//!
//! async fn users() -> pagewise::Result<Page<User>> {
//!     sequence::paginate(&load_users())
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut api = ApiRouter::new().paginated("/users", get(users), &PAGE);
//!     install_pagination(&mut api);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, api.into_router()).await.unwrap();
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 routing: ApiRouter + install_pagination         │
//! │   marker → capture response → bind params → set current page    │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │ context (task-local slots)
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │  params  │   page    │   customize   │   flow    │   cursor    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ PageSize │ Page      │ rename        │ count     │ base64url   │
//! │ LimitOff │ LimitOff  │ params_fields │ fetch     │ quoting     │
//! │ Cursor   │ Cursor    │ aliases ...   │ transform │ pluggable   │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Default bounds for the built-in params
pub mod config;

/// Cursor token encoding
pub mod cursor;

/// Params types and bound params
pub mod params;

/// Page types and page envelopes
pub mod page;

/// Request-scoped pagination state
pub mod context;

/// Deriving page types from modifiers
pub mod customize;

/// Route registry and the pagination install pass
pub mod routing;

/// Generic paginator flow
pub mod flow;

/// Backend adapters
pub mod adapters;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use customize::{customize, CustomizedPage};
pub use flow::Flow;
pub use page::{Page, PageType, CURSOR_PAGE, LIMIT_OFFSET_PAGE, PAGE};
pub use params::{Params, ParamsSpec};
pub use routing::{install_pagination, ApiRouter};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
