//! The route rewriting pass

use super::dependencies::Dependency;
use super::router::ApiRouter;
use std::sync::Arc;

/// Install pagination dependencies on every page route
///
/// Walks the router and every nested router. A route whose response model
/// is a page gets, in order: the marker, response capture, params binding
/// and current-page dependencies. Routes already carrying the marker are
/// left alone, so calling this again is a no-op. Returns the number of
/// routes that were rewritten.
pub fn install_pagination<S>(router: &mut ApiRouter<S>) -> usize
where
    S: Clone + Send + Sync + 'static,
{
    let mut installed = 0;
    for route in router.routes_mut() {
        let Some(page) = route.response.page_type().cloned() else {
            continue;
        };
        if route.dependencies.contains(&Dependency::PaginationMarker) {
            continue;
        }

        route.dependencies.extend([
            Dependency::PaginationMarker,
            Dependency::CaptureResponse,
            Dependency::BindParams(Arc::clone(page.params())),
            Dependency::SetCurrentPage(Arc::clone(&page)),
        ]);
        tracing::debug!(
            path = %route.path,
            page = %page.name(),
            params = %page.params().name(),
            "pagination installed on route"
        );
        installed += 1;
    }

    for nested in router.nested_mut() {
        installed += install_pagination(nested);
    }
    installed
}
