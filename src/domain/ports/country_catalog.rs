//! Country Catalog Port
//!
//! Defines the interface for obtaining the active country segments.

use crate::domain::value_objects::Catalog;
use async_trait::async_trait;

/// Source of the currently active country segments.
///
/// Implementations must absorb every failure and return a usable,
/// non-empty catalog; the locale pipeline never aborts on this call.
#[async_trait]
pub trait CountryCatalog: Send + Sync {
    /// Take a fresh snapshot of the active segments, in display order.
    async fn active_segments(&self) -> Catalog;
}
