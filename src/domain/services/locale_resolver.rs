//! Locale Resolver
//!
//! Maps a detected ISO country to a supported URL segment.
//!
//! Precedence: exact match, then historical alias, then `"us"`, then the
//! first catalog entry, then the literal `"us"`.

use crate::domain::value_objects::{Catalog, FALLBACK_SEGMENT};

/// ISO codes whose URL segment differs (or historically differed) from the code.
const ALIASES: &[(&str, &str)] = &[("GB", "uk"), ("US", "us"), ("CA", "ca"), ("AU", "au")];

fn alias_for(iso_upper: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(iso, _)| *iso == iso_upper)
        .map(|(_, segment)| *segment)
}

/// Resolve the URL segment for an ISO country code.
///
/// Always returns a non-empty segment. It is a member of `catalog`
/// unless the catalog is empty, in which case the literal `"us"` is
/// returned and callers must validate it themselves.
pub fn resolve_segment(iso_country: &str, catalog: &Catalog) -> String {
    let iso = iso_country.trim();
    let lowered = iso.to_lowercase();

    if !lowered.is_empty() && catalog.contains(&lowered) {
        return lowered;
    }

    if let Some(alias) = alias_for(&iso.to_uppercase()) {
        if catalog.contains(alias) {
            return alias.to_string();
        }
    }

    if catalog.contains(FALLBACK_SEGMENT) {
        return FALLBACK_SEGMENT.to_string();
    }

    catalog
        .first()
        .unwrap_or(FALLBACK_SEGMENT)
        .to_string()
}
