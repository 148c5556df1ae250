pub mod country_sync;
pub mod header_extraction;
pub mod locale_resolver;
pub mod redirect_policy;

pub use country_sync::{reconcile, CountryState, CountryStore};
pub use header_extraction::{client_ip, detect_country_code, RawGeoHeaders};
pub use locale_resolver::resolve_segment;
pub use redirect_policy::{classify_route, decide, is_localized, RouteScope};
