//! storefront-geo Library
//!
//! Country/locale resolution edge for a multi-country storefront.
//! Exposes the components for use in integration tests and as a library.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{LocaleOutcome, LocaleRequest, LocaleService};
pub use config::load_config;
pub use domain::entities::{CountryRecord, GeoInfo, GeoSignal, RedirectDecision, ResetToken};
pub use domain::ports::{CountryCatalog, GeoResolver, ResetTokenStore};
pub use domain::services::{CountryState, CountryStore};
pub use domain::value_objects::{Catalog, Environment};
