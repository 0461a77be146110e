//! Working namespace of a page type under customization

use crate::page::{AdditionalField, HeadersHook, ModelConfig, PageKind, PageType};
use crate::params::ParamsSpec;
use crate::types::TypeId;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Mutable copy of a page type's class-level state
///
/// Seeded from the base page type, threaded through every modifier, then
/// synthesized into a new [`PageType`] whose parent is the base.
#[derive(Clone)]
pub struct PageNamespace {
    /// Derived type name
    pub name: String,
    /// Derived module path
    pub module: Option<String>,
    /// Page shape, fixed by the base
    pub kind: PageKind,
    /// Whether the page carries links
    pub links: bool,
    /// Wire aliases
    pub aliases: BTreeMap<String, String>,
    /// Fields hidden from the wire
    pub excluded: BTreeSet<String>,
    /// Schema-layer configuration
    pub config: ModelConfig,
    /// Fields added by customization
    pub additional: Vec<AdditionalField>,
    /// Response headers hook
    pub headers_hook: Option<HeadersHook>,
    /// Legacy schema dialect
    pub legacy: bool,
    params: Arc<ParamsSpec>,
    params_draft: Option<ParamsSpec>,
    params_customized: bool,
}

impl fmt::Debug for PageNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageNamespace")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("params", &self.params().name())
            .field("params_customized", &self.params_customized)
            .field("aliases", &self.aliases)
            .field("excluded", &self.excluded)
            .finish_non_exhaustive()
    }
}

impl PageNamespace {
    /// Seed a namespace from a page type
    pub fn from_page(base: &PageType) -> Self {
        Self {
            name: base.name().to_string(),
            module: base.module().map(ToString::to_string),
            kind: base.kind(),
            links: base.has_links(),
            aliases: base.aliases().clone(),
            excluded: base.excluded().clone(),
            config: base.config().clone(),
            additional: base.additional_fields().to_vec(),
            headers_hook: base.headers_hook().cloned(),
            legacy: base.is_legacy(),
            params: Arc::clone(base.params()),
            params_draft: None,
            params_customized: false,
        }
    }

    /// Current params association, including pending overrides
    pub fn params(&self) -> &ParamsSpec {
        self.params_draft.as_ref().unwrap_or(&*self.params)
    }

    /// Whether the params association was already customized in this chain
    pub fn params_customized(&self) -> bool {
        self.params_customized
    }

    /// Derived params spec, created on first use
    pub fn params_mut(&mut self) -> &mut ParamsSpec {
        self.params_customized = true;
        let params = &self.params;
        self.params_draft.get_or_insert_with(|| params.subclass())
    }

    /// Replace the params association outright
    pub fn replace_params(&mut self, params: Arc<ParamsSpec>) {
        self.params = params;
        self.params_draft = None;
        self.params_customized = true;
    }

    /// All field names the derived page will declare
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

    /// Synthesize the derived page type
    pub fn into_page(self, base: &Arc<PageType>) -> PageType {
        let params = match self.params_draft {
            Some(draft) => Arc::new(draft),
            None => self.params,
        };
        PageType {
            id: TypeId::next(),
            name: self.name,
            module: self.module,
            kind: self.kind,
            links: self.links,
            params,
            aliases: self.aliases,
            excluded: self.excluded,
            config: self.config,
            additional: self.additional,
            headers_hook: self.headers_hook,
            legacy: self.legacy,
            parent: Some(Arc::clone(base)),
        }
    }
}
