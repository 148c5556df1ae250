mod country_catalog;
mod geo_resolver;
mod reset_token_store;

pub use country_catalog::CountryCatalog;
pub use geo_resolver::GeoResolver;
pub use reset_token_store::{ResetTokenStore, TokenStoreError};
