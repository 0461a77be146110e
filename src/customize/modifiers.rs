//! Page type modifiers
//!
//! Each modifier is a pure step `(base, namespace) -> namespace`. The
//! constructor functions at the bottom are the public way to build them.

use super::namespace::PageNamespace;
use crate::cursor::{DecodeFn, EncodeFn};
use crate::error::{Error, Result};
use crate::page::{AdditionalField, HeadersHook, PageKind, PageMeta, PageType};
use crate::params::{FieldKind, ParamsSpec, INCLUDE_TOTAL, QUOTED_CURSOR, STR_CURSOR};
use crate::types::{JsonObject, JsonValue};
use axum::http::HeaderMap;
use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Valid additional field names
static FIELD_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

// ============================================================================
// Param Overrides
// ============================================================================

/// Query descriptor merged onto an existing params field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOverride {
    /// New default; `Null` makes the field optional
    pub default: Option<JsonValue>,
    /// New query-string name
    pub alias: Option<String>,
    /// New lower bound (integer fields)
    pub ge: Option<i64>,
    /// New upper bound (integer fields)
    pub le: Option<i64>,
    /// New description
    pub description: Option<String>,
}

impl QueryOverride {
    /// Start an empty override
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default
    #[must_use]
    pub fn default_value(mut self, value: impl Into<JsonValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set the query alias
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Set the lower bound
    #[must_use]
    pub fn ge(mut self, ge: i64) -> Self {
        self.ge = Some(ge);
        self
    }

    /// Set the upper bound
    #[must_use]
    pub fn le(mut self, le: i64) -> Self {
        self.le = Some(le);
        self
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Value given to `params_fields` for one name
#[derive(Debug, Clone, PartialEq)]
pub enum ParamOverride {
    /// A plain default (or the new value of a class-level constant)
    Default(JsonValue),
    /// A query descriptor
    Query(QueryOverride),
}

impl From<QueryOverride> for ParamOverride {
    fn from(query: QueryOverride) -> Self {
        Self::Query(query)
    }
}

macro_rules! default_override {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ParamOverride {
                fn from(value: $ty) -> Self {
                    Self::Default(JsonValue::from(value))
                }
            }
        )*
    };
}

default_override!(i32, i64, u32, u64, bool, &str, String, JsonValue);

// ============================================================================
// Modifier
// ============================================================================

/// One customization step
#[derive(Clone)]
pub enum Modifier {
    /// Name of the derived page type
    Rename(String),
    /// Module the derived type reports
    Reparent(String),
    /// Replace the params association
    SetParams(Arc<ParamsSpec>),
    /// Whether the count query runs
    IncludeTotal(bool),
    /// Per-field defaults and query overrides
    ParamsFields(Vec<(String, ParamOverride)>),
    /// Make every params field optional
    OptionalParams,
    /// Merge schema/model options
    ModelConfig(JsonObject),
    /// Drop fields from the wire form
    ExcludeFields(Vec<String>),
    /// Rename fields on the wire
    FieldAliases(Vec<(String, String)>),
    /// Declare extra page fields
    AdditionalFields(Vec<AdditionalField>),
    /// Swap the cursor encoder and/or decoder
    CursorEncoding {
        /// Replacement encoder
        encoder: Option<EncodeFn>,
        /// Replacement decoder
        decoder: Option<DecodeFn>,
    },
    /// URL-quote encoded cursors
    QuotedCursor(bool),
    /// Treat decoded cursors as UTF-8 strings
    StrCursor(bool),
    /// Hook writing response headers after `create`
    ResponseHeaders(HeadersHook),
    /// Use `nullable` instead of `anyOf` in schemas
    UseLegacyValidator,
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rename(name) => f.debug_tuple("Rename").field(name).finish(),
            Self::Reparent(module) => f.debug_tuple("Reparent").field(module).finish(),
            Self::SetParams(spec) => f.debug_tuple("SetParams").field(&spec.name()).finish(),
            Self::IncludeTotal(flag) => f.debug_tuple("IncludeTotal").field(flag).finish(),
            Self::ParamsFields(fields) => f.debug_tuple("ParamsFields").field(fields).finish(),
            Self::OptionalParams => f.write_str("OptionalParams"),
            Self::ModelConfig(options) => f.debug_tuple("ModelConfig").field(options).finish(),
            Self::ExcludeFields(names) => f.debug_tuple("ExcludeFields").field(names).finish(),
            Self::FieldAliases(aliases) => f.debug_tuple("FieldAliases").field(aliases).finish(),
            Self::AdditionalFields(fields) => {
                f.debug_tuple("AdditionalFields").field(fields).finish()
            }
            Self::CursorEncoding { encoder, decoder } => f
                .debug_struct("CursorEncoding")
                .field("encoder", &encoder.is_some())
                .field("decoder", &decoder.is_some())
                .finish(),
            Self::QuotedCursor(flag) => f.debug_tuple("QuotedCursor").field(flag).finish(),
            Self::StrCursor(flag) => f.debug_tuple("StrCursor").field(flag).finish(),
            Self::ResponseHeaders(_) => f.write_str("ResponseHeaders(..)"),
            Self::UseLegacyValidator => f.write_str("UseLegacyValidator"),
        }
    }
}

impl Modifier {
    /// Whether this step touches the params association
    pub fn customizes_params(&self) -> bool {
        matches!(
            self,
            Self::IncludeTotal(_)
                | Self::ParamsFields(_)
                | Self::OptionalParams
                | Self::CursorEncoding { .. }
                | Self::QuotedCursor(_)
                | Self::StrCursor(_)
        )
    }

    /// Apply this step to a namespace
    pub fn apply(&self, base: &PageType, mut ns: PageNamespace) -> Result<PageNamespace> {
        match self {
            Self::Rename(name) => ns.name = name.clone(),
            Self::Reparent(module) => ns.module = Some(module.clone()),
            Self::SetParams(spec) => {
                if ns.params_customized() {
                    return Err(Error::ParamsAlreadyCustomized {
                        page: base.name().to_string(),
                    });
                }
                let expected = ns.kind.params_family();
                if spec.family() != expected {
                    return Err(Error::BadParamsType {
                        page: base.name().to_string(),
                        expected,
                        actual: spec.family(),
                    });
                }
                ns.replace_params(Arc::clone(spec));
            }
            Self::IncludeTotal(flag) => {
                ns.params_mut()
                    .set_constant(INCLUDE_TOTAL, JsonValue::Bool(*flag));
            }
            Self::ParamsFields(overrides) => apply_params_fields(&mut ns, overrides)?,
            Self::OptionalParams => ns.params_mut().make_optional(),
            Self::ModelConfig(options) => ns.config.merge(options),
            Self::ExcludeFields(names) => {
                check_fields(&ns, names.iter())?;
                ns.excluded.extend(names.iter().cloned());
            }
            Self::FieldAliases(aliases) => {
                check_fields(&ns, aliases.iter().map(|(field, _)| field))?;
                for (field, alias) in aliases {
                    ns.aliases.insert(field.clone(), alias.clone());
                }
            }
            Self::AdditionalFields(fields) => apply_additional_fields(&mut ns, fields)?,
            Self::CursorEncoding { encoder, decoder } => {
                require_cursor(&ns, "cursor")?;
                let mut codec = ns.params().codec().clone();
                if let Some(encoder) = encoder {
                    codec = codec.with_encoder(Arc::clone(encoder));
                }
                if let Some(decoder) = decoder {
                    codec = codec.with_decoder(Arc::clone(decoder));
                }
                ns.params_mut().set_codec(codec);
            }
            Self::QuotedCursor(flag) => {
                require_cursor(&ns, QUOTED_CURSOR)?;
                ns.params_mut()
                    .set_constant(QUOTED_CURSOR, JsonValue::Bool(*flag));
            }
            Self::StrCursor(flag) => {
                require_cursor(&ns, STR_CURSOR)?;
                ns.params_mut()
                    .set_constant(STR_CURSOR, JsonValue::Bool(*flag));
            }
            Self::ResponseHeaders(hook) => ns.headers_hook = Some(Arc::clone(hook)),
            Self::UseLegacyValidator => ns.legacy = true,
        }
        Ok(ns)
    }
}

fn check_fields<'a>(ns: &PageNamespace, names: impl Iterator<Item = &'a String>) -> Result<()> {
    let fields = ns.fields();
    let unknown: Vec<String> = names
        .filter(|name| !fields.contains(*name))
        .cloned()
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(Error::unknown_fields(ns.name.clone(), unknown))
    }
}

fn require_cursor(ns: &PageNamespace, name: &str) -> Result<()> {
    if ns.kind == PageKind::Cursor {
        Ok(())
    } else {
        Err(Error::unknown_fields(
            ns.params().name().to_string(),
            vec![name.to_string()],
        ))
    }
}

fn apply_params_fields(ns: &mut PageNamespace, overrides: &[(String, ParamOverride)]) -> Result<()> {
    let unknown: Vec<String> = overrides
        .iter()
        .map(|(name, _)| name)
        .filter(|name| ns.params().constant(name).is_none() && ns.params().field(name).is_none())
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(Error::unknown_fields(ns.params().name().to_string(), unknown));
    }

    for (name, value) in overrides {
        if ns.params().constant(name).is_some() {
            let constant = match value {
                ParamOverride::Default(value) => value.clone(),
                ParamOverride::Query(query) => query.default.clone().unwrap_or(JsonValue::Null),
            };
            ns.params_mut().set_constant(name.clone(), constant);
            continue;
        }

        let Some(mut field) = ns.params().field(name).cloned() else {
            continue;
        };
        match value {
            ParamOverride::Default(value) => field.default = Some(value.clone()),
            ParamOverride::Query(query) => {
                if let Some(default) = &query.default {
                    field.default = Some(default.clone());
                }
                if let Some(alias) = &query.alias {
                    field.alias = Some(alias.clone());
                }
                if let Some(description) = &query.description {
                    field.description = Some(description.clone());
                }
                if query.ge.is_some() || query.le.is_some() {
                    let (ge, le) = match field.kind {
                        FieldKind::Integer { ge, le } => (ge, le),
                        _ => (None, None),
                    };
                    field.kind = FieldKind::bounded(query.ge.or(ge), query.le.or(le));
                }
            }
        }
        ns.params_mut().replace_field(field)?;
    }
    Ok(())
}

fn apply_additional_fields(ns: &mut PageNamespace, fields: &[AdditionalField]) -> Result<()> {
    let base_fields = ns.kind.base_fields();
    for field in fields {
        if !FIELD_NAME_REGEX.is_match(&field.name)
            || base_fields.contains(&field.name.as_str())
            || field.name == "links"
        {
            return Err(Error::InvalidFieldName {
                name: field.name.clone(),
            });
        }
        match ns.additional.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field.clone(),
            None => ns.additional.push(field.clone()),
        }
    }
    Ok(())
}

// ============================================================================
// Constructors
// ============================================================================

/// Set the derived type name
pub fn rename(name: impl Into<String>) -> Modifier {
    Modifier::Rename(name.into())
}

/// Set the derived type module
pub fn reparent(module: impl Into<String>) -> Modifier {
    Modifier::Reparent(module.into())
}

/// Replace the params association; must precede params-level modifiers
pub fn set_params(spec: &Arc<ParamsSpec>) -> Modifier {
    Modifier::SetParams(Arc::clone(spec))
}

/// Toggle total counting
pub fn include_total(flag: bool) -> Modifier {
    Modifier::IncludeTotal(flag)
}

/// Override params fields or constants by name
pub fn params_fields<I, K, V>(overrides: I) -> Modifier
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<ParamOverride>,
{
    Modifier::ParamsFields(
        overrides
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect(),
    )
}

/// Make every params field optional with a null default
pub fn optional_params() -> Modifier {
    Modifier::OptionalParams
}

/// Merge schema-layer options (`title`, `description`, `populate_by_name`, ...)
pub fn model_config(options: JsonObject) -> Modifier {
    Modifier::ModelConfig(options)
}

/// Hide fields from the wire
pub fn exclude_fields<I, S>(names: I) -> Modifier
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Modifier::ExcludeFields(names.into_iter().map(Into::into).collect())
}

/// Declare wire aliases, `(field, alias)` pairs
pub fn field_aliases<I, K, V>(aliases: I) -> Modifier
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    Modifier::FieldAliases(
        aliases
            .into_iter()
            .map(|(field, alias)| (field.into(), alias.into()))
            .collect(),
    )
}

/// Add fields to the page
pub fn additional_fields(fields: impl IntoIterator<Item = AdditionalField>) -> Modifier {
    Modifier::AdditionalFields(fields.into_iter().collect())
}

/// Replace the cursor encoder and/or decoder
pub fn cursor_encoding(encoder: Option<EncodeFn>, decoder: Option<DecodeFn>) -> Modifier {
    Modifier::CursorEncoding { encoder, decoder }
}

/// Toggle percent-quoting of cursor tokens
pub fn quoted_cursor(flag: bool) -> Modifier {
    Modifier::QuotedCursor(flag)
}

/// Toggle the UTF-8 requirement on decoded cursors
pub fn str_cursor(flag: bool) -> Modifier {
    Modifier::StrCursor(flag)
}

/// Derive response headers from every finished page
pub fn response_headers<F>(hook: F) -> Modifier
where
    F: Fn(&PageMeta) -> HeaderMap + Send + Sync + 'static,
{
    Modifier::ResponseHeaders(Arc::new(hook))
}

/// Use the legacy schema dialect
pub fn use_legacy_validator() -> Modifier {
    Modifier::UseLegacyValidator
}
