mod http_country_catalog;
mod maxmind_geo_resolver;
mod sqlite_reset_token_store;

pub use http_country_catalog::{CatalogError, HttpCountryCatalog, StaticCountryCatalog};
pub use maxmind_geo_resolver::MaxMindGeoResolver;
pub use sqlite_reset_token_store::SqliteResetTokenStore;
