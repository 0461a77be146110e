//! JSON schema of a page type

use super::page_type::PageType;
use crate::types::{JsonObject, JsonValue};
use serde_json::json;

impl PageType {
    /// JSON schema for `Page<T>` given the schema of `T`
    ///
    /// Legacy page types express optional values with `nullable: true`,
    /// others with `anyOf` including `null`.
    pub fn json_schema(&self, item_schema: JsonValue) -> JsonValue {
        let mut properties = JsonObject::new();
        let mut required = Vec::new();

        for field in self.fields() {
            if self.excluded().contains(&field) {
                continue;
            }
            let wire = self.wire_name(&field).to_string();
            let (schema, is_required) = self.field_schema(&field, &item_schema);
            if is_required {
                required.push(json!(wire));
            }
            properties.insert(wire, schema);
        }

        let mut schema = JsonObject::new();
        schema.insert(
            "title".into(),
            json!(self.config().title.as_deref().unwrap_or(self.name())),
        );
        if let Some(description) = &self.config().description {
            schema.insert("description".into(), json!(description));
        }
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), JsonValue::Object(properties));
        schema.insert("required".into(), JsonValue::Array(required));
        for (key, value) in &self.config().extra {
            schema.entry(key.clone()).or_insert_with(|| value.clone());
        }
        JsonValue::Object(schema)
    }

    fn field_schema(&self, field: &str, item_schema: &JsonValue) -> (JsonValue, bool) {
        let integer = json!({ "type": "integer", "minimum": 0 });
        let string = json!({ "type": "string" });
        match field {
            "items" => (json!({ "type": "array", "items": item_schema }), true),
            "total" => (self.nullable(integer), false),
            "page" | "size" => {
                let optional = self
                    .params()
                    .field(field)
                    .map_or(true, |f| f.default == Some(JsonValue::Null));
                (self.nullable(integer), !optional)
            }
            "limit" | "offset" | "pages" => (self.nullable(integer), false),
            "current_page" | "current_page_backwards" | "previous_page" | "next_page" => {
                (self.nullable(string), false)
            }
            "links" => (links_schema(), true),
            _ => match self.additional_fields().iter().find(|f| f.name == field) {
                Some(additional) => (
                    additional.field_type.schema(),
                    additional.default.is_none(),
                ),
                None => (json!({}), false),
            },
        }
    }

    fn nullable(&self, schema: JsonValue) -> JsonValue {
        if self.is_legacy() {
            let mut schema = schema;
            if let JsonValue::Object(object) = &mut schema {
                object.insert("nullable".into(), json!(true));
            }
            schema
        } else {
            json!({ "anyOf": [schema, { "type": "null" }] })
        }
    }
}

fn links_schema() -> JsonValue {
    let link = json!({ "type": "string" });
    json!({
        "title": "Links",
        "type": "object",
        "properties": {
            "first": link,
            "last": link,
            "self": link,
            "next": link,
            "prev": link,
        },
    })
}
