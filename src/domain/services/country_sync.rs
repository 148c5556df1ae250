//! Client Country Store
//!
//! Mirrors the country named by the URL. The URL is the source of truth;
//! the store is a cache that is reconciled on every navigation.

use crate::domain::value_objects::{Catalog, FALLBACK_SEGMENT};

/// Selection state of the country store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CountryState {
    #[default]
    Uninitialized,
    Ready(String),
}

impl CountryState {
    pub fn selected(&self) -> Option<&str> {
        match self {
            Self::Uninitialized => None,
            Self::Ready(code) => Some(code),
        }
    }
}

/// First path segment, lower-cased. `None` for the root.
pub fn leading_segment(path: &str) -> Option<String> {
    let path = path.split(['?', '#']).next().unwrap_or("");
    path.split('/')
        .find(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
}

/// Reconcile the store against the URL.
///
/// Without a catalog nothing is decided. A known segment that differs from
/// the selection replaces it; anything else leaves the state untouched.
pub fn reconcile(
    state: &CountryState,
    url_segment: Option<&str>,
    catalog: Option<&Catalog>,
) -> CountryState {
    let (Some(catalog), Some(segment)) = (catalog, url_segment) else {
        return state.clone();
    };

    let segment = segment.to_lowercase();
    if !catalog.contains(&segment) || state.selected() == Some(segment.as_str()) {
        return state.clone();
    }

    CountryState::Ready(segment)
}

/// Stateful wrapper that applies [`reconcile`] to navigation events.
#[derive(Debug, Clone, Default)]
pub struct CountryStore {
    state: CountryState,
    catalog: Option<Catalog>,
    path: Option<String>,
}

impl CountryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CountryState {
        &self.state
    }

    pub fn selected(&self) -> Option<&str> {
        self.state.selected()
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    /// First client mount.
    pub fn mount(&mut self, path: &str) {
        self.navigate(path);
    }

    /// Path changed; the URL wins over the stored selection.
    pub fn navigate(&mut self, path: &str) {
        self.path = Some(path.to_string());
        let segment = leading_segment(path);
        self.state = reconcile(&self.state, segment.as_deref(), self.catalog.as_ref());
    }

    /// Catalog arrived; resolve any navigation that was deferred.
    pub fn catalog_loaded(&mut self, catalog: Catalog) {
        self.catalog = Some(catalog.or_default());
        if let Some(path) = self.path.clone() {
            self.navigate(&path);
        }
    }

    /// Catalog fetch failed: fall back to the default set.
    ///
    /// The stored URL is reconciled against it; `"us"` is assumed only when
    /// nothing has been selected yet so rendering is never blocked.
    pub fn catalog_failed(&mut self) {
        if self.catalog.is_none() {
            self.catalog = Some(Catalog::default_set());
        }
        if let Some(path) = self.path.clone() {
            self.navigate(&path);
        }
        if self.state == CountryState::Uninitialized {
            self.state = CountryState::Ready(FALLBACK_SEGMENT.to_string());
        }
    }

    /// User picked a country from the selector.
    ///
    /// Updates the selection immediately and returns the homepage the
    /// caller must navigate to. Unknown codes are rejected once a catalog
    /// is loaded.
    pub fn select(&mut self, code: &str) -> Option<String> {
        let code = code.trim().to_lowercase();
        if code.is_empty() {
            return None;
        }
        if let Some(catalog) = &self.catalog {
            if !catalog.contains(&code) {
                return None;
            }
        }
        let target = format!("/{}", code);
        self.state = CountryState::Ready(code);
        Some(target)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    // ===== leading_segment Tests =====

    #[test]
    fn test_leading_segment() {
        assert_eq!(leading_segment("/uk/shop"), Some("uk".to_string()));
        assert_eq!(leading_segment("/CA"), Some("ca".to_string()));
        assert_eq!(leading_segment("/au?ref=1"), Some("au".to_string()));
        assert_eq!(leading_segment("/"), None);
        assert_eq!(leading_segment(""), None);
    }

    // ===== reconcile Tests =====

    #[test]
    fn test_reconcile_without_catalog_defers() {
        let state = reconcile(&CountryState::Uninitialized, Some("uk"), None);
        assert_eq!(state, CountryState::Uninitialized);

        let ready = CountryState::Ready("us".to_string());
        assert_eq!(reconcile(&ready, Some("uk"), None), ready);
    }

    #[test]
    fn test_reconcile_initializes_from_url() {
        let catalog = Catalog::default_set();
        let state = reconcile(&CountryState::Uninitialized, Some("uk"), Some(&catalog));
        assert_eq!(state, CountryState::Ready("uk".to_string()));
    }

    #[test]
    fn test_reconcile_url_wins() {
        let catalog = Catalog::default_set();
        let state = CountryState::Ready("us".to_string());
        assert_eq!(
            reconcile(&state, Some("AU"), Some(&catalog)),
            CountryState::Ready("au".to_string())
        );
    }

    #[test]
    fn test_reconcile_ignores_unknown_segment() {
        let catalog = Catalog::default_set();
        let state = CountryState::Ready("ca".to_string());
        assert_eq!(reconcile(&state, Some("shop"), Some(&catalog)), state);
        assert_eq!(reconcile(&state, None, Some(&catalog)), state);
    }

    // ===== CountryStore Tests =====

    #[test]
    fn test_store_defers_until_catalog_loads() {
        let mut store = CountryStore::new();
        store.mount("/ca/jackets");
        assert_eq!(store.state(), &CountryState::Uninitialized);

        store.catalog_loaded(Catalog::default_set());
        assert_eq!(store.selected(), Some("ca"));
    }

    #[test]
    fn test_store_follows_navigation() {
        let mut store = CountryStore::new();
        store.catalog_loaded(Catalog::default_set());
        store.mount("/us");
        assert_eq!(store.selected(), Some("us"));

        store.navigate("/uk/shop");
        assert_eq!(store.selected(), Some("uk"));

        store.navigate("/blog/post");
        assert_eq!(store.selected(), Some("uk"));
    }

    #[test]
    fn test_store_catalog_failure_selects_us() {
        let mut store = CountryStore::new();
        store.mount("/");
        store.catalog_failed();
        assert_eq!(store.selected(), Some("us"));
    }

    #[test]
    fn test_store_catalog_failure_keeps_existing_selection() {
        let mut store = CountryStore::new();
        store.select("au");
        store.catalog_failed();
        assert_eq!(store.selected(), Some("au"));
    }

    #[test]
    fn test_store_catalog_failure_follows_url() {
        let mut store = CountryStore::new();
        store.mount("/uk/shop");
        store.catalog_failed();
        assert_eq!(store.selected(), Some("uk"));
        assert_eq!(store.catalog(), Some(&Catalog::default_set()));

        store.navigate("/ca");
        assert_eq!(store.selected(), Some("ca"));
    }

    #[test]
    fn test_store_catalog_failure_restricts_select_to_default_set() {
        let mut store = CountryStore::new();
        store.mount("/");
        store.catalog_failed();

        assert_eq!(store.select("de"), None);
        assert_eq!(store.selected(), Some("us"));
        assert_eq!(store.select("au").as_deref(), Some("/au"));
        assert_eq!(store.selected(), Some("au"));
    }

    #[test]
    fn test_store_catalog_failure_keeps_loaded_catalog() {
        let mut store = CountryStore::new();
        store.catalog_loaded(Catalog::from_codes(["nz", "us"]));
        store.mount("/nz");
        store.catalog_failed();
        assert_eq!(store.catalog(), Some(&Catalog::from_codes(["nz", "us"])));
        assert_eq!(store.selected(), Some("nz"));
    }

    #[test]
    fn test_store_empty_catalog_uses_default() {
        let mut store = CountryStore::new();
        store.catalog_loaded(Catalog::from_codes(Vec::<&str>::new()));
        assert_eq!(store.catalog(), Some(&Catalog::default_set()));
    }

    #[test]
    fn test_select_round_trips_through_url() {
        let mut store = CountryStore::new();
        store.catalog_loaded(Catalog::default_set());
        store.mount("/us/shop");

        let target = store.select("AU").unwrap();
        assert_eq!(target, "/au");
        assert_eq!(store.selected(), Some("au"));

        store.navigate(&target);
        assert_eq!(store.selected(), Some("au"));
    }

    #[test]
    fn test_select_rejects_unknown_code() {
        let mut store = CountryStore::new();
        store.catalog_loaded(Catalog::default_set());
        store.mount("/uk");
        assert_eq!(store.select("de"), None);
        assert_eq!(store.select(" "), None);
        assert_eq!(store.selected(), Some("uk"));
    }
}
