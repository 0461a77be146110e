//! Route registry with response models

use super::dependencies::{pagination_middleware, Dependency};
use crate::page::PageType;
use crate::types::JsonValue;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::routing::MethodRouter;
use axum::Router;
use serde_json::json;
use std::fmt;
use std::sync::Arc;

/// Declared response envelope of a route
#[derive(Debug, Clone)]
pub enum ResponseModel {
    /// The route returns a page of the given type
    Page {
        /// Page type
        page: Arc<PageType>,
        /// JSON schema of one item, used for API docs
        item_schema: JsonValue,
    },
    /// Anything else
    Plain,
}

impl ResponseModel {
    /// Page response with an unconstrained item schema
    pub fn page(page: &Arc<PageType>) -> Self {
        Self::Page {
            page: Arc::clone(page),
            item_schema: json!({}),
        }
    }

    /// Set the item schema of a page response
    #[must_use]
    pub fn items(self, schema: JsonValue) -> Self {
        match self {
            Self::Page { page, .. } => Self::Page {
                page,
                item_schema: schema,
            },
            Self::Plain => Self::Plain,
        }
    }

    /// Page type, if this is a page response
    pub fn page_type(&self) -> Option<&Arc<PageType>> {
        match self {
            Self::Page { page, .. } => Some(page),
            Self::Plain => None,
        }
    }
}

/// A registered route
pub struct RouteEntry<S = ()> {
    pub(crate) path: String,
    pub(crate) method_router: MethodRouter<S>,
    pub(crate) response: ResponseModel,
    pub(crate) dependencies: Vec<Dependency>,
}

impl<S> fmt::Debug for RouteEntry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("path", &self.path)
            .field("response", &self.response)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

impl<S> RouteEntry<S> {
    /// Route path, relative to its router
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Declared response model
    pub fn response(&self) -> &ResponseModel {
        &self.response
    }

    /// Dependencies run before the handler
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }
}

/// Router that remembers response models so pagination can be installed
///
/// Build routes as with [`axum::Router`], call
/// [`install_pagination`](super::install_pagination), then
/// [`into_router`](ApiRouter::into_router) to get the axum router.
pub struct ApiRouter<S = ()> {
    routes: Vec<RouteEntry<S>>,
    nested: Vec<(String, ApiRouter<S>)>,
}

impl<S> fmt::Debug for ApiRouter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRouter")
            .field("routes", &self.routes)
            .field("nested", &self.nested)
            .finish()
    }
}

impl<S> Default for ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Create an empty router
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            nested: Vec::new(),
        }
    }

    /// Add a route with a plain response
    #[must_use]
    pub fn route(self, path: impl Into<String>, method_router: MethodRouter<S>) -> Self {
        self.route_with(path, method_router, ResponseModel::Plain)
    }

    /// Add a route returning pages of `page`
    #[must_use]
    pub fn paginated(
        self,
        path: impl Into<String>,
        method_router: MethodRouter<S>,
        page: &Arc<PageType>,
    ) -> Self {
        self.route_with(path, method_router, ResponseModel::page(page))
    }

    /// Add a route with an explicit response model
    #[must_use]
    pub fn route_with(
        mut self,
        path: impl Into<String>,
        method_router: MethodRouter<S>,
        response: ResponseModel,
    ) -> Self {
        self.routes.push(RouteEntry {
            path: path.into(),
            method_router,
            response,
            dependencies: Vec::new(),
        });
        self
    }

    /// Mount a router under a path prefix
    #[must_use]
    pub fn nest(mut self, prefix: impl Into<String>, router: ApiRouter<S>) -> Self {
        self.nested.push((prefix.into(), router));
        self
    }

    /// Merge the routes of another router
    #[must_use]
    pub fn merge(mut self, other: ApiRouter<S>) -> Self {
        self.routes.extend(other.routes);
        self.nested.extend(other.nested);
        self
    }

    /// Routes registered directly on this router
    pub fn routes(&self) -> &[RouteEntry<S>] {
        &self.routes
    }

    pub(crate) fn routes_mut(&mut self) -> &mut [RouteEntry<S>] {
        &mut self.routes
    }

    pub(crate) fn nested_mut(&mut self) -> impl Iterator<Item = &mut ApiRouter<S>> {
        self.nested.iter_mut().map(|(_, router)| router)
    }

    /// Every route with its full path, nested routers included
    pub fn all_routes(&self) -> Vec<(String, &RouteEntry<S>)> {
        let mut all: Vec<(String, &RouteEntry<S>)> = self
            .routes
            .iter()
            .map(|route| (route.path.clone(), route))
            .collect();
        for (prefix, router) in &self.nested {
            for (path, route) in router.all_routes() {
                all.push((join_path(prefix, &path), route));
            }
        }
        all
    }

    /// Materialize the axum router
    ///
    /// Routes with dependencies get a middleware that runs them before the
    /// handler and scopes the pagination context around it.
    pub fn into_router(self) -> Router<S> {
        let mut router = Router::new();
        for (path, route) in self.flatten(String::new()) {
            let method_router = if route.dependencies.is_empty() {
                route.method_router
            } else {
                let dependencies: Arc<[Dependency]> = route.dependencies.into();
                route
                    .method_router
                    .layer(middleware::from_fn(move |request: Request, next: Next| {
                        pagination_middleware(Arc::clone(&dependencies), request, next)
                    }))
            };
            router = router.route(&path, method_router);
        }
        router
    }

    fn flatten(self, prefix: String) -> Vec<(String, RouteEntry<S>)> {
        let mut flat: Vec<(String, RouteEntry<S>)> = self
            .routes
            .into_iter()
            .map(|route| (join_path(&prefix, &route.path), route))
            .collect();
        for (nested_prefix, router) in self.nested {
            flat.extend(router.flatten(join_path(&prefix, &nested_prefix)));
        }
        flat
    }
}

/// Join a mount prefix and a route path
pub(crate) fn join_path(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    match (prefix.is_empty(), path) {
        (true, "") => "/".to_string(),
        (true, path) => path.to_string(),
        (false, "" | "/") => prefix.to_string(),
        (false, path) if path.starts_with('/') => format!("{prefix}{path}"),
        (false, path) => format!("{prefix}/{path}"),
    }
}
