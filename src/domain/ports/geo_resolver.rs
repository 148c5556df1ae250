//! GeoIP Resolver Port
//!
//! Defines the interface for resolving IP addresses to countries.

use crate::domain::entities::GeoInfo;
use std::net::IpAddr;

/// Resolver for IP address to geographic location.
///
/// This is an outbound port that abstracts the GeoIP database.
/// It plays the role of the runtime-provided geo object: consulted only
/// after every country header has been tried.
pub trait GeoResolver: Send + Sync {
    /// Resolve an IP address to geographic information.
    ///
    /// Returns None if the IP cannot be resolved.
    fn resolve(&self, ip: IpAddr) -> Option<GeoInfo>;
}
