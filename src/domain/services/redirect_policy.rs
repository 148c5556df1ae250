//! Redirect Policy
//!
//! Decides whether a page request is redirected to a localized URL, and
//! which requests the locale middleware applies to at all.

use crate::domain::entities::{DecisionReason, RedirectDecision};
use crate::domain::value_objects::Catalog;

/// Which part of the edge a request path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteScope {
    /// `/api` and everything below it: CORS only, no locale logic
    Api,
    /// Static assets and files: untouched
    Excluded,
    /// Storefront pages: run the locale policy
    Page,
}

const EXCLUDED_PREFIXES: &[&str] = &["/_next/static", "/_next/image", "/favicon.ico"];

fn has_prefix_segment(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// True when any path segment carries a `.ext` suffix.
fn has_file_extension(path: &str) -> bool {
    path.split('/').any(|segment| match segment.rfind('.') {
        Some(idx) => idx + 1 < segment.len(),
        None => false,
    })
}

/// Classify a request path.
pub fn classify_route(path: &str) -> RouteScope {
    if has_prefix_segment(path, "/api") {
        return RouteScope::Api;
    }
    if EXCLUDED_PREFIXES.iter().any(|p| has_prefix_segment(path, p)) || has_file_extension(path) {
        return RouteScope::Excluded;
    }
    RouteScope::Page
}

/// Does `path` already begin with a catalog segment?
///
/// Matching is case-insensitive and the segment must be followed by `/`
/// or end the path, so `/usa` is not localized under `us`.
pub fn is_localized(path: &str, catalog: &Catalog) -> bool {
    let lowered = path.to_lowercase();
    catalog.iter().any(|code| {
        let prefix = format!("/{}", code);
        has_prefix_segment(&lowered, &prefix)
    })
}

/// Decide what to do with a page request.
///
/// Only the bare root is geo-redirected; unlocalized deep links pass
/// through untouched. `query` excludes the leading `?`.
pub fn decide(path: &str, query: Option<&str>, catalog: &Catalog, segment: &str) -> RedirectDecision {
    if is_localized(path, catalog) {
        return RedirectDecision::pass_through(path, DecisionReason::AlreadyLocalized);
    }

    if path == "/" {
        let target = match query.filter(|q| !q.is_empty()) {
            Some(q) => format!("/{}/?{}", segment, q),
            None => format!("/{}/", segment),
        };
        return RedirectDecision::redirect(target);
    }

    RedirectDecision::pass_through(path, DecisionReason::UnlocalizedDeepLink)
}
