//! Params specs and bound params
//!
//! A [`ParamsSpec`] describes the query parameters a page type consumes:
//! their query names, bounds, defaults and class-level constants. Binding a
//! query string against a spec yields [`Params`], which reduce to raw params.

use super::types::{AnyRawParams, CursorRawParams, ParamsFamily, RawParams};
use crate::cursor::CursorCodec;
use crate::error::{Error, ParamIssue, Result};
use crate::types::{JsonObject, JsonValue, TypeId};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Constant controlling whether the total is counted
pub const INCLUDE_TOTAL: &str = "include_total";
/// Constant controlling whether decoded cursors must be UTF-8
pub const STR_CURSOR: &str = "str_cursor";
/// Constant controlling percent-quoting of cursor tokens
pub const QUOTED_CURSOR: &str = "quoted_cursor";

// ============================================================================
// Fields
// ============================================================================

/// Value kind of a query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Integer with optional inclusive bounds
    Integer {
        /// Lower bound (inclusive)
        ge: Option<i64>,
        /// Upper bound (inclusive)
        le: Option<i64>,
    },
    /// Free-form string
    String,
    /// Boolean flag
    Boolean,
}

impl FieldKind {
    /// Unbounded integer
    pub fn integer() -> Self {
        Self::Integer { ge: None, le: None }
    }

    /// Integer with bounds
    pub fn bounded(ge: Option<i64>, le: Option<i64>) -> Self {
        Self::Integer { ge, le }
    }

    fn schema_type(&self) -> &'static str {
        match self {
            Self::Integer { .. } => "integer",
            Self::String => "string",
            Self::Boolean => "boolean",
        }
    }
}

/// A single bindable query parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamField {
    /// Internal name, used by `to_raw_params`
    pub name: String,
    /// Query-string name when it differs from `name`
    pub alias: Option<String>,
    /// Value kind and bounds
    pub kind: FieldKind,
    /// Default value; `None` makes the field required
    pub default: Option<JsonValue>,
    /// Description for API docs
    pub description: Option<String>,
}

impl ParamField {
    /// Create a required field
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            alias: None,
            kind,
            default: None,
            description: None,
        }
    }

    /// Set the default value
    #[must_use]
    pub fn with_default(mut self, default: impl Into<JsonValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the query alias
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Name used in the query string
    pub fn query_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Whether binding fails when the parameter is absent
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// Validate a single incoming value against this field
    fn validate(&self, value: Option<&JsonValue>) -> std::result::Result<JsonValue, ParamIssue> {
        let loc = self.query_name();
        let value = match value {
            None | Some(JsonValue::Null) => {
                return self
                    .default
                    .clone()
                    .ok_or_else(|| ParamIssue::query(loc, "missing", "Field required"));
            }
            Some(value) => value,
        };

        match &self.kind {
            FieldKind::Integer { ge, le } => {
                let number = match value {
                    JsonValue::Number(n) => n.as_i64(),
                    JsonValue::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                }
                .ok_or_else(|| {
                    ParamIssue::query(
                        loc,
                        "int_parsing",
                        "Input should be a valid integer, unable to parse string as an integer",
                    )
                })?;
                if let Some(ge) = ge {
                    if number < *ge {
                        return Err(ParamIssue::query(
                            loc,
                            "greater_than_equal",
                            format!("Input should be greater than or equal to {ge}"),
                        ));
                    }
                }
                if let Some(le) = le {
                    if number > *le {
                        return Err(ParamIssue::query(
                            loc,
                            "less_than_equal",
                            format!("Input should be less than or equal to {le}"),
                        ));
                    }
                }
                Ok(json!(number))
            }
            FieldKind::String => match value {
                JsonValue::String(s) => Ok(JsonValue::String(s.clone())),
                JsonValue::Number(n) => Ok(JsonValue::String(n.to_string())),
                JsonValue::Bool(b) => Ok(JsonValue::String(b.to_string())),
                _ => Err(ParamIssue::query(
                    loc,
                    "string_type",
                    "Input should be a valid string",
                )),
            },
            FieldKind::Boolean => {
                let flag = match value {
                    JsonValue::Bool(b) => Some(*b),
                    JsonValue::String(s) => match s.to_ascii_lowercase().as_str() {
                        "true" | "1" | "yes" | "on" => Some(true),
                        "false" | "0" | "no" | "off" => Some(false),
                        _ => None,
                    },
                    _ => None,
                };
                flag.map(JsonValue::Bool).ok_or_else(|| {
                    ParamIssue::query(
                        loc,
                        "bool_parsing",
                        "Input should be a valid boolean, unable to interpret input",
                    )
                })
            }
        }
    }

    /// OpenAPI parameter object for this field
    pub fn openapi_parameter(&self) -> JsonValue {
        let mut schema = JsonObject::new();
        schema.insert("type".into(), json!(self.kind.schema_type()));
        if let FieldKind::Integer { ge, le } = &self.kind {
            if let Some(ge) = ge {
                schema.insert("minimum".into(), json!(ge));
            }
            if let Some(le) = le {
                schema.insert("maximum".into(), json!(le));
            }
        }
        if let Some(default) = &self.default {
            schema.insert("default".into(), default.clone());
        }

        let mut param = JsonObject::new();
        param.insert("name".into(), json!(self.query_name()));
        param.insert("in".into(), json!("query"));
        param.insert("required".into(), json!(self.is_required()));
        param.insert("schema".into(), JsonValue::Object(schema));
        if let Some(description) = &self.description {
            param.insert("description".into(), json!(description));
        }
        JsonValue::Object(param)
    }
}

// ============================================================================
// Params Spec
// ============================================================================

/// Description of a params type: fields, constants, cursor codec
///
/// Specs are immutable once shared. Deriving a variant goes through
/// [`ParamsSpec::subclass`], which records the parent so
/// [`ParamsSpec::is_subclass_of`] keeps working across customizations.
#[derive(Debug, Clone)]
pub struct ParamsSpec {
    id: TypeId,
    name: String,
    family: ParamsFamily,
    fields: Vec<ParamField>,
    constants: BTreeMap<String, JsonValue>,
    codec: CursorCodec,
    parent: Option<Arc<ParamsSpec>>,
}

impl ParamsSpec {
    /// Create a root spec
    pub fn new(name: impl Into<String>, family: ParamsFamily, fields: Vec<ParamField>) -> Self {
        let mut constants = BTreeMap::new();
        constants.insert(
            INCLUDE_TOTAL.to_string(),
            JsonValue::Bool(family != ParamsFamily::Cursor),
        );
        if family == ParamsFamily::Cursor {
            constants.insert(STR_CURSOR.to_string(), JsonValue::Bool(true));
            constants.insert(QUOTED_CURSOR.to_string(), JsonValue::Bool(true));
        }
        Self {
            id: TypeId::next(),
            name: name.into(),
            family,
            fields,
            constants,
            codec: CursorCodec::default(),
            parent: None,
        }
    }

    /// Start a derived spec with a fresh identity and `self` as parent
    pub fn subclass(self: &Arc<Self>) -> Self {
        Self {
            id: TypeId::next(),
            name: self.name.clone(),
            family: self.family,
            fields: self.fields.clone(),
            constants: self.constants.clone(),
            codec: self.codec.clone(),
            parent: Some(Arc::clone(self)),
        }
    }

    /// Unique identity
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Spec name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Family, decides the raw shape
    pub fn family(&self) -> ParamsFamily {
        self.family
    }

    /// Ordered fields
    pub fn fields(&self) -> &[ParamField] {
        &self.fields
    }

    /// Look up a field by internal name
    pub fn field(&self, name: &str) -> Option<&ParamField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Class-level constants
    pub fn constants(&self) -> &BTreeMap<String, JsonValue> {
        &self.constants
    }

    /// Look up a class-level constant
    pub fn constant(&self, name: &str) -> Option<&JsonValue> {
        self.constants.get(name)
    }

    /// Cursor codec
    pub fn codec(&self) -> &CursorCodec {
        &self.codec
    }

    /// Parent spec, if derived
    pub fn parent(&self) -> Option<&Arc<ParamsSpec>> {
        self.parent.as_ref()
    }

    /// Whether `self` is `other` or derives from it
    pub fn is_subclass_of(&self, other: &ParamsSpec) -> bool {
        if self.id == other.id {
            return true;
        }
        let mut current = self.parent.as_deref();
        while let Some(spec) = current {
            if spec.id == other.id {
                return true;
            }
            current = spec.parent.as_deref();
        }
        false
    }

    /// Value of the `include_total` constant
    pub fn include_total(&self) -> bool {
        self.constant_bool(INCLUDE_TOTAL)
            .unwrap_or(self.family != ParamsFamily::Cursor)
    }

    /// Value of the `quoted_cursor` constant
    pub fn quoted_cursor(&self) -> bool {
        self.constant_bool(QUOTED_CURSOR).unwrap_or(true)
    }

    /// Value of the `str_cursor` constant
    pub fn str_cursor(&self) -> bool {
        self.constant_bool(STR_CURSOR).unwrap_or(true)
    }

    fn constant_bool(&self, name: &str) -> Option<bool> {
        self.constants.get(name).and_then(JsonValue::as_bool)
    }

    // ------------------------------------------------------------------------
    // Mutators, only used while a derived spec is being built
    // ------------------------------------------------------------------------

    /// Rename the spec
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Overwrite a class-level constant
    pub fn set_constant(&mut self, name: impl Into<String>, value: JsonValue) {
        self.constants.insert(name.into(), value);
    }

    /// Replace the codec
    pub fn set_codec(&mut self, codec: CursorCodec) {
        self.codec = codec;
    }

    /// Replace a field definition by name
    pub fn replace_field(&mut self, field: ParamField) -> Result<()> {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(slot) => {
                *slot = field;
                Ok(())
            }
            None => Err(Error::unknown_fields(self.name.clone(), vec![field.name])),
        }
    }

    /// Make every field optional with a null default
    pub fn make_optional(&mut self) {
        for field in &mut self.fields {
            field.default = Some(JsonValue::Null);
        }
    }

    // ------------------------------------------------------------------------
    // Binding
    // ------------------------------------------------------------------------

    /// Bind params from a raw query string (`a=1&b=2`)
    pub fn bind_query(self: &Arc<Self>, query: Option<&str>) -> Result<Params> {
        let mut pairs: HashMap<String, String> = HashMap::new();
        if let Some(query) = query {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                pairs
                    .entry(key.into_owned())
                    .or_insert_with(|| value.into_owned());
            }
        }
        self.bind_pairs(&pairs)
    }

    /// Bind params from decoded query pairs keyed by query name
    pub fn bind_pairs(self: &Arc<Self>, pairs: &HashMap<String, String>) -> Result<Params> {
        let mut values = BTreeMap::new();
        let mut issues = Vec::new();
        for field in &self.fields {
            let incoming = pairs
                .get(field.query_name())
                .map(|v| JsonValue::String(v.clone()));
            match field.validate(incoming.as_ref()) {
                Ok(value) => {
                    values.insert(field.name.clone(), value);
                }
                Err(issue) => issues.push(issue),
            }
        }
        if !issues.is_empty() {
            return Err(Error::InvalidParams { issues });
        }
        Ok(Params {
            spec: Arc::clone(self),
            values,
        })
    }

    /// Build params programmatically, keyed by internal field name
    pub fn instantiate(self: &Arc<Self>, values: JsonObject) -> Result<Params> {
        let unknown: Vec<String> = values
            .keys()
            .filter(|key| self.field(key).is_none())
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(Error::unknown_fields(self.name.clone(), unknown));
        }

        let mut bound = BTreeMap::new();
        let mut issues = Vec::new();
        for field in &self.fields {
            match field.validate(values.get(&field.name)) {
                Ok(value) => {
                    bound.insert(field.name.clone(), value);
                }
                Err(issue) => issues.push(issue),
            }
        }
        if !issues.is_empty() {
            return Err(Error::InvalidParams { issues });
        }
        Ok(Params {
            spec: Arc::clone(self),
            values: bound,
        })
    }

    /// OpenAPI parameter objects for every field
    pub fn openapi_parameters(&self) -> Vec<JsonValue> {
        self.fields
            .iter()
            .map(ParamField::openapi_parameter)
            .collect()
    }
}

// ============================================================================
// Bound Params
// ============================================================================

/// Validated params bound from a request (or built explicitly)
#[derive(Clone)]
pub struct Params {
    spec: Arc<ParamsSpec>,
    values: BTreeMap<String, JsonValue>,
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Params")
            .field("spec", &self.spec.name())
            .field("values", &self.values)
            .finish()
    }
}

impl PartialEq for Params {
    fn eq(&self, other: &Self) -> bool {
        self.spec.id() == other.spec.id() && self.values == other.values
    }
}

impl Params {
    /// Spec these params were bound against
    pub fn spec(&self) -> &Arc<ParamsSpec> {
        &self.spec
    }

    /// Family of the spec
    pub fn family(&self) -> ParamsFamily {
        self.spec.family()
    }

    /// Raw bound value by internal field name
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    /// Bound value as an unsigned integer
    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(JsonValue::as_u64)
    }

    /// Bound value as a string
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(JsonValue::as_str)
    }

    /// All bound values as a JSON object
    pub fn to_json(&self) -> JsonObject {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Reduce to the normalized raw form
    pub fn to_raw_params(&self) -> Result<AnyRawParams> {
        let include_total = self.spec.include_total();
        match self.spec.family() {
            ParamsFamily::PageSize => {
                let page = self.get_u64("page");
                let size = self.get_u64("size");
                let offset = match (page, size) {
                    (Some(page), Some(size)) => size.saturating_mul(page.saturating_sub(1)),
                    _ => 0,
                };
                Ok(AnyRawParams::LimitOffset(
                    RawParams::new(size, offset).with_include_total(include_total),
                ))
            }
            ParamsFamily::LimitOffset => Ok(AnyRawParams::LimitOffset(
                RawParams::new(self.get_u64("limit"), self.get_u64("offset").unwrap_or(0))
                    .with_include_total(include_total),
            )),
            ParamsFamily::Cursor => {
                let cursor = self
                    .spec
                    .codec()
                    .decode_wire(self.get_str("cursor"), self.spec.quoted_cursor())?;
                if self.spec.str_cursor() {
                    if let Some(bytes) = &cursor {
                        std::str::from_utf8(bytes)
                            .map_err(|e| Error::invalid_cursor(e.to_string()))?;
                    }
                }
                Ok(AnyRawParams::Cursor(CursorRawParams {
                    cursor,
                    size: self.get_u64("size"),
                    include_total,
                }))
            }
        }
    }
}
