//! Page metadata, extras and field declarations

use crate::params::ParamsFamily;
use crate::types::{JsonObject, JsonValue};
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Page Kind
// ============================================================================

/// Built-in page shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageKind {
    /// `page`, `size`, `pages`
    PageSize,
    /// `limit`, `offset`
    LimitOffset,
    /// Opaque cursor tokens
    Cursor,
}

impl PageKind {
    /// Params family this page consumes
    pub fn params_family(self) -> ParamsFamily {
        match self {
            Self::PageSize => ParamsFamily::PageSize,
            Self::LimitOffset => ParamsFamily::LimitOffset,
            Self::Cursor => ParamsFamily::Cursor,
        }
    }

    /// Built-in wire fields, in serialization order
    pub fn base_fields(self) -> &'static [&'static str] {
        match self {
            Self::PageSize => &["items", "total", "page", "size", "pages"],
            Self::LimitOffset => &["items", "total", "limit", "offset"],
            Self::Cursor => &[
                "items",
                "total",
                "current_page",
                "current_page_backwards",
                "previous_page",
                "next_page",
            ],
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.params_family(), f)
    }
}

// ============================================================================
// Links
// ============================================================================

/// Navigation links of a link page
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Links {
    /// First page
    pub first: Option<String>,
    /// Last page
    pub last: Option<String>,
    /// The requested page
    #[serde(rename = "self")]
    pub self_: Option<String>,
    /// Following page
    pub next: Option<String>,
    /// Preceding page
    pub prev: Option<String>,
}

// ============================================================================
// Page Metadata
// ============================================================================

/// Everything a page carries besides its items
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageMeta {
    /// Total number of items, when counted
    pub total: Option<u64>,
    /// Page number (page-size)
    pub page: Option<u64>,
    /// Page size (page-size)
    pub size: Option<u64>,
    /// Number of pages (page-size)
    pub pages: Option<u64>,
    /// Limit (limit-offset)
    pub limit: Option<u64>,
    /// Offset (limit-offset)
    pub offset: Option<u64>,
    /// Encoded cursor of this page (cursor)
    pub current_page: Option<String>,
    /// Encoded backwards cursor of this page (cursor)
    pub current_page_backwards: Option<String>,
    /// Encoded cursor of the previous page (cursor)
    pub previous_page: Option<String>,
    /// Encoded cursor of the next page (cursor)
    pub next_page: Option<String>,
    /// Navigation links (link pages)
    pub links: Option<Links>,
}

impl PageMeta {
    /// Value of a built-in field as JSON
    pub fn field_value(&self, name: &str) -> Option<JsonValue> {
        let value = match name {
            "total" => json!(self.total),
            "page" => json!(self.page),
            "size" => json!(self.size),
            "pages" => json!(self.pages),
            "limit" => json!(self.limit),
            "offset" => json!(self.offset),
            "current_page" => json!(self.current_page),
            "current_page_backwards" => json!(self.current_page_backwards),
            "previous_page" => json!(self.previous_page),
            "next_page" => json!(self.next_page),
            "links" => json!(self.links),
            _ => return None,
        };
        Some(value)
    }

    /// Set a built-in field from JSON; returns false for unknown names
    pub fn set_field_value(&mut self, name: &str, value: &JsonValue) -> bool {
        let as_u64 = value.as_u64();
        let as_string = value.as_str().map(ToString::to_string);
        match name {
            "total" => self.total = as_u64,
            "page" => self.page = as_u64,
            "size" => self.size = as_u64,
            "pages" => self.pages = as_u64,
            "limit" => self.limit = as_u64,
            "offset" => self.offset = as_u64,
            "current_page" => self.current_page = as_string,
            "current_page_backwards" => self.current_page_backwards = as_string,
            "previous_page" => self.previous_page = as_string,
            "next_page" => self.next_page = as_string,
            "links" => self.links = serde_json::from_value(value.clone()).ok(),
            _ => return false,
        }
        true
    }
}

// ============================================================================
// Create Extras
// ============================================================================

/// Shape-specific values passed to `create`
#[derive(Debug, Clone, Default)]
pub struct PageExtras {
    /// Raw token of the next page (cursor pages)
    pub next: Option<Vec<u8>>,
    /// Raw token of the previous page (cursor pages)
    pub previous: Option<Vec<u8>>,
    /// Raw backwards token of the current page (cursor pages)
    pub current_backwards: Option<Vec<u8>>,
    /// Values for additional fields
    pub fields: JsonObject,
    /// Request path and query for links, overrides the ambient request
    pub request_uri: Option<String>,
}

impl PageExtras {
    /// Create empty extras
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the next-page token
    #[must_use]
    pub fn next(mut self, token: Option<Vec<u8>>) -> Self {
        self.next = token;
        self
    }

    /// Set the previous-page token
    #[must_use]
    pub fn previous(mut self, token: Option<Vec<u8>>) -> Self {
        self.previous = token;
        self
    }

    /// Set the backwards token of the current page
    #[must_use]
    pub fn current_backwards(mut self, token: Option<Vec<u8>>) -> Self {
        self.current_backwards = token;
        self
    }

    /// Set one additional field value
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Merge additional field values
    #[must_use]
    pub fn fields(mut self, fields: JsonObject) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Set the request path and query used for links
    #[must_use]
    pub fn request_uri(mut self, uri: impl Into<String>) -> Self {
        self.request_uri = Some(uri.into());
        self
    }
}

// ============================================================================
// Field Declarations
// ============================================================================

/// Schema type of an additional field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// JSON integer
    Integer,
    /// Any JSON number
    Number,
    /// JSON string
    String,
    /// JSON boolean
    Boolean,
    /// JSON object
    Object,
    /// JSON array
    Array,
    /// Unconstrained
    Any,
}

impl FieldType {
    /// JSON schema fragment for this type
    pub fn schema(self) -> JsonValue {
        match self {
            Self::Integer => json!({ "type": "integer" }),
            Self::Number => json!({ "type": "number" }),
            Self::String => json!({ "type": "string" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Object => json!({ "type": "object" }),
            Self::Array => json!({ "type": "array", "items": {} }),
            Self::Any => json!({}),
        }
    }
}

/// A field added to a page type by customization
#[derive(Debug, Clone, PartialEq)]
pub struct AdditionalField {
    /// Field name
    pub name: String,
    /// Schema type
    pub field_type: FieldType,
    /// Default value; `None` makes the field required at `create`
    pub default: Option<JsonValue>,
}

impl AdditionalField {
    /// A required field (`type` form)
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: None,
        }
    }

    /// A field with a default (`(type, default)` form)
    pub fn with_default(
        name: impl Into<String>,
        field_type: FieldType,
        default: impl Into<JsonValue>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: Some(default.into()),
        }
    }
}

// ============================================================================
// Model Config
// ============================================================================

/// Schema-layer configuration of a page type
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelConfig {
    /// Schema title, defaults to the page type name
    pub title: Option<String>,
    /// Schema description
    pub description: Option<String>,
    /// Accept internal field names as well as aliases when parsing
    pub populate_by_name: bool,
    /// Options the crate does not interpret, kept for schema output
    pub extra: JsonObject,
}

impl ModelConfig {
    /// Merge options; known keys update typed fields, others land in `extra`
    pub fn merge(&mut self, options: &JsonObject) {
        for (key, value) in options {
            match key.as_str() {
                "title" => self.title = value.as_str().map(ToString::to_string),
                "description" => self.description = value.as_str().map(ToString::to_string),
                "populate_by_name" => self.populate_by_name = value.as_bool().unwrap_or(false),
                _ => {
                    self.extra.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

/// Hook deriving response headers from a finished page
pub type HeadersHook = Arc<dyn Fn(&PageMeta) -> HeaderMap + Send + Sync>;
