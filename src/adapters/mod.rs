//! Adapters Layer
//!
//! Inbound adapters drive the application (HTTP edge); outbound adapters
//! implement the domain ports (catalog API, GeoIP, token storage).

pub mod inbound;
pub mod outbound;
