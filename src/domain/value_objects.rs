//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use serde::{Deserialize, Serialize};

/// Segments used whenever the remote catalog cannot be trusted.
pub const DEFAULT_SEGMENTS: [&str; 4] = ["us", "uk", "ca", "au"];

/// Segment of last resort when nothing else matches.
pub const FALLBACK_SEGMENT: &str = "us";

/// Ordered set of active country segments usable as the first URL component.
///
/// Segments are lowercase, trimmed and unique. Insertion order is preserved
/// so that "first active entry" follows the catalog's display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    segments: Vec<String>,
}

impl Catalog {
    /// Build a catalog from raw codes, normalizing and de-duplicating.
    ///
    /// Blank codes are dropped. The result may be empty; callers that need
    /// a usable catalog should go through [`Catalog::or_default`].
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut segments: Vec<String> = Vec::new();
        for code in codes {
            let code = code.as_ref().trim().to_lowercase();
            if code.is_empty() || segments.contains(&code) {
                continue;
            }
            segments.push(code);
        }
        Self { segments }
    }

    /// The static `{us, uk, ca, au}` catalog.
    pub fn default_set() -> Self {
        Self::from_codes(DEFAULT_SEGMENTS)
    }

    /// Replace an empty catalog with the default set.
    ///
    /// An empty catalog is never a valid routing table.
    pub fn or_default(self) -> Self {
        if self.segments.is_empty() {
            Self::default_set()
        } else {
            self
        }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, code: &str) -> bool {
        let code = code.to_lowercase();
        self.segments.iter().any(|s| *s == code)
    }

    /// First segment in catalog order.
    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Comma-joined rendering used in diagnostics.
    pub fn joined(&self) -> String {
        self.segments.join(",")
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::default_set()
    }
}

impl std::fmt::Display for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.joined())
    }
}

/// Deployment environment. Anything other than production enables geo debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    /// Parse an environment name. Unknown names are treated as development.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::Development
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== Catalog Tests =====

    #[test]
    fn test_catalog_normalizes_codes() {
        let catalog = Catalog::from_codes([" US ", "Uk", "ca"]);
        assert_eq!(catalog.iter().collect::<Vec<_>>(), vec!["us", "uk", "ca"]);
    }

    #[test]
    fn test_catalog_deduplicates_preserving_order() {
        let catalog = Catalog::from_codes(["au", "us", "AU", "us"]);
        assert_eq!(catalog.iter().collect::<Vec<_>>(), vec!["au", "us"]);
    }

    #[test]
    fn test_catalog_drops_blank_codes() {
        let catalog = Catalog::from_codes(["", "  ", "nz"]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.first(), Some("nz"));
    }

    #[test]
    fn test_catalog_contains_is_case_insensitive() {
        let catalog = Catalog::default_set();
        assert!(catalog.contains("UK"));
        assert!(catalog.contains("uk"));
        assert!(!catalog.contains("de"));
    }

    #[test]
    fn test_empty_catalog_falls_back_to_default() {
        let catalog = Catalog::from_codes(Vec::<String>::new()).or_default();
        assert_eq!(catalog, Catalog::default_set());
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_non_empty_catalog_is_kept() {
        let catalog = Catalog::from_codes(["nz"]).or_default();
        assert_eq!(catalog.joined(), "nz");
    }

    #[test]
    fn test_catalog_display() {
        assert_eq!(Catalog::default_set().to_string(), "{us,uk,ca,au}");
    }

    // ===== Environment Tests =====

    #[test]
    fn test_environment_from_str() {
        assert_eq!(Environment::from_str("production"), Environment::Production);
        assert_eq!(Environment::from_str("PROD"), Environment::Production);
        assert_eq!(Environment::from_str("staging"), Environment::Development);
        assert_eq!(Environment::from_str(""), Environment::Development);
    }

    #[test]
    fn test_environment_default_is_development() {
        assert!(!Environment::default().is_production());
    }
}
