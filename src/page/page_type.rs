//! Page type descriptors and page construction

use super::links::{limit_offset_links, page_size_links};
use super::types::{
    AdditionalField, HeadersHook, Links, ModelConfig, PageExtras, PageKind, PageMeta,
};
use super::Page;
use crate::context;
use crate::error::{Error, ParamIssue, Result};
use crate::params::{AnyRawParams, ParamField, Params, ParamsSpec};
use crate::types::{ceil_div, JsonObject, TypeId};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// A page "class": shape, params association and wire customizations
///
/// Page types are built once and shared behind `Arc`. The item type is not
/// part of the descriptor, so one page type serves `Page<T>` for every `T`.
#[derive(Clone)]
pub struct PageType {
    pub(crate) id: TypeId,
    pub(crate) name: String,
    pub(crate) module: Option<String>,
    pub(crate) kind: PageKind,
    pub(crate) links: bool,
    pub(crate) params: Arc<ParamsSpec>,
    pub(crate) aliases: BTreeMap<String, String>,
    pub(crate) excluded: BTreeSet<String>,
    pub(crate) config: ModelConfig,
    pub(crate) additional: Vec<AdditionalField>,
    pub(crate) headers_hook: Option<HeadersHook>,
    pub(crate) legacy: bool,
    pub(crate) parent: Option<Arc<PageType>>,
}

impl fmt::Debug for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageType")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("links", &self.links)
            .field("params", &self.params.name())
            .field("aliases", &self.aliases)
            .field("excluded", &self.excluded)
            .field("additional", &self.additional)
            .field("headers_hook", &self.headers_hook.is_some())
            .finish_non_exhaustive()
    }
}

impl PageType {
    /// Create a root page type
    pub fn new(name: impl Into<String>, kind: PageKind, params: Arc<ParamsSpec>) -> Self {
        Self {
            id: TypeId::next(),
            name: name.into(),
            module: None,
            kind,
            links: false,
            params,
            aliases: BTreeMap::new(),
            excluded: BTreeSet::new(),
            config: ModelConfig::default(),
            additional: Vec::new(),
            headers_hook: None,
            legacy: false,
            parent: None,
        }
    }

    /// Add a `links` field
    #[must_use]
    pub fn with_links(mut self) -> Self {
        self.links = true;
        self
    }

    /// Set the module path
    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Unique identity
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module path, if set
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// `module.name`, or the bare name without a module
    pub fn qualified_name(&self) -> String {
        match &self.module {
            Some(module) => format!("{module}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Page shape
    pub fn kind(&self) -> PageKind {
        self.kind
    }

    /// Whether the page carries a `links` field
    pub fn has_links(&self) -> bool {
        self.links
    }

    /// Params this page consumes
    pub fn params(&self) -> &Arc<ParamsSpec> {
        &self.params
    }

    /// Wire aliases by field name
    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    /// Fields hidden from the wire
    pub fn excluded(&self) -> &BTreeSet<String> {
        &self.excluded
    }

    /// Schema-layer configuration
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Fields added by customization
    pub fn additional_fields(&self) -> &[AdditionalField] {
        &self.additional
    }

    /// Response headers hook
    pub fn headers_hook(&self) -> Option<&HeadersHook> {
        self.headers_hook.as_ref()
    }

    /// Whether the legacy schema dialect is used
    pub fn is_legacy(&self) -> bool {
        self.legacy
    }

    /// Parent page type, if derived
    pub fn parent(&self) -> Option<&Arc<PageType>> {
        self.parent.as_ref()
    }

    /// Whether `self` is `other` or derives from it
    pub fn is_subclass_of(&self, other: &PageType) -> bool {
        if self.id == other.id {
            return true;
        }
        let mut current = self.parent.as_deref();
        while let Some(page) = current {
            if page.id == other.id {
                return true;
            }
            current = page.parent.as_deref();
        }
        false
    }

    /// All field names in wire order, excluded ones included
    pub fn fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self
            .kind
            .base_fields()
            .iter()
            .map(ToString::to_string)
            .collect();
        if self.links {
            fields.push("links".to_string());
        }
        fields.extend(self.additional.iter().map(|f| f.name.clone()));
        fields
    }

    /// Whether the page declares a field
    pub fn has_field(&self, name: &str) -> bool {
        self.fields().iter().any(|f| f == name)
    }

    /// Name of a field on the wire
    pub fn wire_name<'a>(&'a self, field: &'a str) -> &'a str {
        self.aliases.get(field).map_or(field, String::as_str)
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    /// Build a page from fetched items and the bound params
    pub fn create<T>(
        self: &Arc<Self>,
        items: Vec<T>,
        params: &Params,
        total: Option<u64>,
        extras: PageExtras,
    ) -> Result<Page<T>> {
        let expected = self.kind.params_family();
        if params.family() != expected {
            return Err(Error::BadParamsType {
                page: self.name.clone(),
                expected,
                actual: params.family(),
            });
        }

        let mut meta = PageMeta {
            total,
            ..PageMeta::default()
        };
        match self.kind {
            PageKind::PageSize => {
                meta.page = params.get_u64("page");
                meta.size = params.get_u64("size");
                meta.pages = match (total, meta.size) {
                    (Some(total), Some(size)) => ceil_div(total, size),
                    _ => None,
                };
                if let (Some(page), Some(pages)) = (meta.page, meta.pages) {
                    self.check_page_bound(params, page, pages)?;
                }
            }
            PageKind::LimitOffset => {
                meta.limit = params.get_u64("limit");
                meta.offset = params.get_u64("offset");
            }
            PageKind::Cursor => {
                let current = match params.to_raw_params()? {
                    AnyRawParams::Cursor(raw) => raw.cursor,
                    AnyRawParams::LimitOffset(_) => None,
                };
                let codec = self.params.codec();
                let quoted = self.params.quoted_cursor();
                meta.current_page = codec.encode_wire(current.as_deref(), quoted)?;
                meta.current_page_backwards =
                    codec.encode_wire(extras.current_backwards.as_deref(), quoted)?;
                meta.next_page = codec.encode_wire(extras.next.as_deref(), quoted)?;
                meta.previous_page = codec.encode_wire(extras.previous.as_deref(), quoted)?;
            }
        }

        if self.links {
            meta.links = Some(self.build_links(&meta, params, items.len(), &extras));
        }

        let mut extra = JsonObject::new();
        for field in &self.additional {
            let value = extras
                .fields
                .get(&field.name)
                .cloned()
                .or_else(|| field.default.clone())
                .ok_or_else(|| Error::MissingField {
                    page: self.name.clone(),
                    field: field.name.clone(),
                })?;
            extra.insert(field.name.clone(), value);
        }

        if let Some(hook) = &self.headers_hook {
            let headers = hook(&meta);
            match context::response() {
                Ok(handle) => handle.extend_headers(headers),
                Err(_) => tracing::debug!(
                    page = %self.name,
                    "no response handle in scope, skipping response headers"
                ),
            }
        }

        Ok(Page {
            page_type: Arc::clone(self),
            items,
            meta,
            extra,
        })
    }

    /// With a known total, `page` must not pass `max(pages, 1)`
    fn check_page_bound(&self, params: &Params, page: u64, pages: u64) -> Result<()> {
        let last = pages.max(1);
        if page <= last {
            return Ok(());
        }
        let name = params
            .spec()
            .field("page")
            .map_or("page", ParamField::query_name);
        Err(Error::InvalidParams {
            issues: vec![ParamIssue::query(
                name,
                "less_than_equal",
                format!("Input should be less than or equal to {last}"),
            )],
        })
    }

    fn build_links(
        &self,
        meta: &PageMeta,
        params: &Params,
        items_len: usize,
        extras: &PageExtras,
    ) -> Links {
        let uri = extras
            .request_uri
            .clone()
            .or_else(|| context::request().ok().map(|r| r.path_and_query()))
            .unwrap_or_else(|| "/".to_string());
        let key = |name: &str| {
            params
                .spec()
                .field(name)
                .map_or_else(|| name.to_string(), |f| f.query_name().to_string())
        };

        match self.kind {
            PageKind::PageSize => page_size_links(
                &uri,
                &key("page"),
                meta.page.unwrap_or(1),
                meta.size,
                meta.total,
                items_len,
            ),
            PageKind::LimitOffset => limit_offset_links(
                &uri,
                &key("offset"),
                meta.limit,
                meta.offset.unwrap_or(0),
                meta.total,
                items_len,
            ),
            PageKind::Cursor => Links {
                self_: Some(uri),
                ..Links::default()
            },
        }
    }
}
