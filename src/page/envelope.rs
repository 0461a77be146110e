//! The page envelope and its wire form

use super::page_type::PageType;
use super::types::PageMeta;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::sync::Arc;

/// A finished page of `T`
///
/// The wire shape follows the page type: field aliases, exclusions and
/// additional fields are applied when serializing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub(crate) page_type: Arc<PageType>,
    pub(crate) items: Vec<T>,
    pub(crate) meta: PageMeta,
    pub(crate) extra: JsonObject,
}

impl<T> Page<T> {
    /// Page type this page was built by
    pub fn page_type(&self) -> &Arc<PageType> {
        &self.page_type
    }

    /// Items on this page
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, keeping the items
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Metadata
    pub fn meta(&self) -> &PageMeta {
        &self.meta
    }

    /// Total number of items, if counted
    pub fn total(&self) -> Option<u64> {
        self.meta.total
    }

    /// Value of an additional field
    pub fn extra(&self, name: &str) -> Option<&JsonValue> {
        self.extra.get(name)
    }
}

impl<T: PartialEq> PartialEq for Page<T> {
    fn eq(&self, other: &Self) -> bool {
        self.page_type.id() == other.page_type.id()
            && self.items == other.items
            && self.meta == other.meta
            && self.extra == other.extra
    }
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let page_type = &self.page_type;
        let fields: Vec<String> = page_type
            .fields()
            .into_iter()
            .filter(|f| !page_type.excluded().contains(f))
            .collect();

        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for field in &fields {
            let key = page_type.wire_name(field);
            if field == "items" {
                map.serialize_entry(key, &self.items)?;
            } else if let Some(value) = self.meta.field_value(field) {
                map.serialize_entry(key, &value)?;
            } else {
                let value = self.extra.get(field.as_str()).unwrap_or(&JsonValue::Null);
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

impl PageType {
    /// Parse a page from its wire form
    ///
    /// Fields are looked up by wire alias; with `populate_by_name` set the
    /// internal name is accepted too. Excluded fields are not read.
    pub fn parse<T: DeserializeOwned>(self: &Arc<Self>, value: JsonValue) -> Result<Page<T>> {
        let JsonValue::Object(mut object) = value else {
            return Err(Error::Other(format!(
                "Page '{}' must be a JSON object",
                self.name()
            )));
        };

        let mut items = Vec::new();
        let mut meta = PageMeta::default();
        let mut extra = JsonObject::new();
        for field in self.fields() {
            if self.excluded().contains(&field) {
                continue;
            }
            let wire = self.wire_name(&field).to_string();
            let value = object.remove(&wire).or_else(|| {
                if self.config().populate_by_name {
                    object.remove(&field)
                } else {
                    None
                }
            });
            let Some(value) = value else {
                if field == "items" {
                    return Err(Error::MissingField {
                        page: self.name().to_string(),
                        field,
                    });
                }
                continue;
            };

            if field == "items" {
                items = serde_json::from_value(value)?;
            } else if !meta.set_field_value(&field, &value) {
                extra.insert(field, value);
            }
        }

        Ok(Page {
            page_type: Arc::clone(self),
            items,
            meta,
            extra,
        })
    }
}
