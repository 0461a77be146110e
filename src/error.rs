//! Error types for pagewise
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Client errors (bad query parameters, bad cursors) render as HTTP 400
//! through the [`IntoResponse`] impl. Everything else is a programmer or
//! adapter error and renders as a generic HTTP 500.

use crate::params::{ParamsFamily, ParamsShape};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Message shown when the request context is missing
pub const UNINITIALIZED_HINT: &str =
    "use explicit params or install pagination on the app/router (install_pagination)";

/// A single query-parameter validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamIssue {
    /// Location of the failing value, e.g. `["query", "size"]`
    pub loc: Vec<String>,
    /// Human readable message
    pub msg: String,
    /// Machine readable kind, e.g. `less_than_equal`
    #[serde(rename = "type")]
    pub kind: String,
}

impl ParamIssue {
    /// Create an issue for a query parameter
    pub fn query(name: impl Into<String>, kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            loc: vec!["query".to_string(), name.into()],
            msg: msg.into(),
            kind: kind.into(),
        }
    }
}

/// The main error type for pagewise
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Request Context Errors
    // ============================================================================
    /// A context slot was read outside of an installed route
    #[error("Pagination context is not initialized ({slot}): {}", UNINITIALIZED_HINT)]
    UninitializedPage {
        /// Name of the unset slot
        slot: &'static str,
    },

    // ============================================================================
    // Page / Params Errors
    // ============================================================================
    /// Params of the wrong family for a page type
    #[error("Page '{page}' expects {expected} params, got {actual}")]
    BadParamsType {
        /// Page type name
        page: String,
        /// Family the page type needs
        expected: ParamsFamily,
        /// Family that was given
        actual: ParamsFamily,
    },

    /// The adapter cannot handle the raw params shape
    #[error("Params shape '{actual}' is not supported, accepted shapes: {}", format_shapes(.accepted))]
    ParamsShapeUnsupported {
        /// Shapes the flow accepts
        accepted: Vec<ParamsShape>,
        /// Shape of the bound params
        actual: ParamsShape,
    },

    /// An additional field without default got no value
    #[error("Field '{field}' is required for page '{page}'")]
    MissingField {
        /// Page type name
        page: String,
        /// Missing field
        field: String,
    },

    /// Query params failed validation
    #[error("Invalid query parameters")]
    InvalidParams {
        /// One entry per failing value
        issues: Vec<ParamIssue>,
    },

    /// A cursor token could not be decoded
    #[error("Invalid cursor value")]
    InvalidCursor {
        /// Decoder detail, not shown to clients
        message: String,
    },

    // ============================================================================
    // Customization Errors
    // ============================================================================
    /// `set_params` after the params association was already customized
    #[error("Params of page '{page}' were already customized; set_params must come first")]
    ParamsAlreadyCustomized {
        /// Base page type name
        page: String,
    },

    /// A modifier named fields the target does not declare
    #[error("Unknown fields on '{target}': {}", .fields.join(", "))]
    UnknownField {
        /// Page or params type name
        target: String,
        /// Offending field names
        fields: Vec<String>,
    },

    /// A field name is not a valid identifier
    #[error("Invalid field name '{name}'")]
    InvalidFieldName {
        /// Rejected name
        name: String,
    },

    // ============================================================================
    // Flow Errors
    // ============================================================================
    /// Async transformer used with a sync terminal operation
    #[error("Async items transformer cannot run in the sync flow, use apaginate")]
    AsyncTransformer,

    /// Error raised by an adapter's count or fetch
    #[error("Adapter error: {0}")]
    Adapter(#[from] anyhow::Error),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// Inconsistent configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong
        message: String,
    },

    /// YAML config parse failure
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parse failure
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    /// Anything else
    #[error("{0}")]
    Other(String),
}

fn format_shapes(shapes: &[ParamsShape]) -> String {
    shapes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Create an uninitialized context error for a slot
    pub fn uninitialized(slot: &'static str) -> Self {
        Self::UninitializedPage { slot }
    }

    /// Create an invalid cursor error
    pub fn invalid_cursor(message: impl Into<String>) -> Self {
        Self::InvalidCursor {
            message: message.into(),
        }
    }

    /// Create an unknown field error
    pub fn unknown_fields(target: impl Into<String>, fields: Vec<String>) -> Self {
        Self::UnknownField {
            target: target.into(),
            fields,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap an adapter error
    pub fn adapter(err: impl Into<anyhow::Error>) -> Self {
        Self::Adapter(err.into())
    }

    /// Check if this error was caused by the client request
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidParams { .. } | Error::InvalidCursor { .. })
    }

    /// HTTP status this error renders as
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Error::InvalidParams { issues } => json!({ "detail": issues }),
            Error::InvalidCursor { .. } => json!({ "detail": self.to_string() }),
            _ => {
                tracing::error!(error = %self, "pagination request failed");
                json!({ "detail": "Internal Server Error" })
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for pagewise
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_cursor("bad padding");
        assert_eq!(err.to_string(), "Invalid cursor value");

        let err = Error::unknown_fields("Params", vec!["foo".into(), "bar".into()]);
        assert_eq!(err.to_string(), "Unknown fields on 'Params': foo, bar");

        let err = Error::ParamsShapeUnsupported {
            accepted: vec![ParamsShape::LimitOffset],
            actual: ParamsShape::Cursor,
        };
        assert_eq!(
            err.to_string(),
            "Params shape 'cursor' is not supported, accepted shapes: limit-offset"
        );
    }

    #[test]
    fn test_uninitialized_message_is_actionable() {
        let err = Error::uninitialized("params");
        let text = err.to_string();
        assert!(text.contains("params"));
        assert!(text.contains("install pagination on the app/router"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::invalid_cursor("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::InvalidParams { issues: vec![] }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::uninitialized("page_type").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(!Error::AsyncTransformer.is_client_error());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
