//! OpenAPI document for paginated routes

use super::dependencies::Dependency;
use super::router::{ApiRouter, ResponseModel};
use crate::types::{JsonObject, JsonValue};
use serde_json::json;

/// Convert `/users/:id` to `/users/{id}`
fn openapi_path(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn operation_id(path: &str) -> String {
    let id: String = path
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("list{}", id.trim_end_matches('_'))
}

impl<S> ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Build an OpenAPI document covering the page routes
    ///
    /// Query parameters come from the bound params of installed routes, so a
    /// route only documents them after `install_pagination` ran.
    pub fn openapi(&self, title: &str, version: &str) -> JsonValue {
        let mut paths = JsonObject::new();
        let mut schemas = JsonObject::new();

        for (path, route) in self.all_routes() {
            let ResponseModel::Page { page, item_schema } = route.response() else {
                continue;
            };

            let parameters: Vec<JsonValue> = route
                .dependencies()
                .iter()
                .filter_map(|dependency| match dependency {
                    Dependency::BindParams(spec) => Some(spec.openapi_parameters()),
                    _ => None,
                })
                .flatten()
                .collect();

            let schema = page.json_schema(item_schema.clone());
            let schema_name = schema["title"]
                .as_str()
                .unwrap_or(page.name())
                .to_string();
            schemas.insert(schema_name.clone(), schema);

            let operation = json!({
                "operationId": operation_id(&path),
                "parameters": parameters,
                "responses": {
                    "200": {
                        "description": "Successful Response",
                        "content": {
                            "application/json": {
                                "schema": { "$ref": format!("#/components/schemas/{schema_name}") }
                            }
                        }
                    },
                    "400": { "description": "Invalid pagination parameters" }
                }
            });
            paths.insert(openapi_path(&path), json!({ "get": operation }));
        }

        json!({
            "openapi": "3.1.0",
            "info": { "title": title, "version": version },
            "paths": paths,
            "components": { "schemas": schemas },
        })
    }
}
