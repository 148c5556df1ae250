//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the locale policy.
//! They have no external dependencies and contain only business logic.

use serde::{Deserialize, Serialize};

/// Sentinel used when no IP could be extracted from the request.
pub const UNKNOWN_IP: &str = "unknown";

/// Country assumed when no geo signal is present.
pub const DEFAULT_COUNTRY: &str = "US";

/// A country as published by the backend catalog.
///
/// Read-only for this service: fetched per request, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryRecord {
    /// URL segment code, lowercase 2-letter or custom (e.g. "uk")
    pub country_code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub currency_symbol: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Geographic signal derived from inbound headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeoSignal {
    /// Client IP, or [`UNKNOWN_IP`]
    pub ip: String,
    /// ISO 3166-1 alpha-2 code, uppercase
    pub iso_country: String,
}

impl GeoSignal {
    pub fn new(ip: impl Into<String>, iso_country: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            iso_country: iso_country.into(),
        }
    }
}

impl Default for GeoSignal {
    fn default() -> Self {
        Self::new(UNKNOWN_IP, DEFAULT_COUNTRY)
    }
}

/// Country reported by a runtime geo lookup (e.g. a GeoIP database).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoInfo {
    /// Country code (ISO 3166-1 alpha-2)
    pub country: String,
}

impl GeoInfo {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
        }
    }
}

/// Why a redirect decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// Path already starts with a catalog segment
    AlreadyLocalized,
    /// Bare root sent to the visitor's segment
    RootGeoRedirect,
    /// Not localized and not root; left alone
    UnlocalizedDeepLink,
}

impl DecisionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyLocalized => "already-localized",
            Self::RootGeoRedirect => "root-geo-redirect",
            Self::UnlocalizedDeepLink => "unlocalized-deep-link",
        }
    }
}

impl std::fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of the redirect policy for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectDecision {
    pub should_redirect: bool,
    /// Redirect target when `should_redirect`, otherwise the original path
    pub target_path: String,
    pub reason: DecisionReason,
}

impl RedirectDecision {
    pub fn pass_through(path: &str, reason: DecisionReason) -> Self {
        Self {
            should_redirect: false,
            target_path: path.to_string(),
            reason,
        }
    }

    pub fn redirect(target: String) -> Self {
        Self {
            should_redirect: true,
            target_path: target,
            reason: DecisionReason::RootGeoRedirect,
        }
    }
}

/// A single-use password reset token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetToken {
    pub token: String,
    pub email: String,
    /// Expiry as unix seconds
    pub expires_at: u64,
}

impl ResetToken {
    pub fn is_expired(&self, now_secs: u64) -> bool {
        now_secs >= self.expires_at
    }
}
