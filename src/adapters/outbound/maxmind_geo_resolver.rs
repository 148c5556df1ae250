//! MaxMind GeoIP Resolver
//!
//! Implements GeoResolver using a MaxMind GeoLite2/GeoIP2 country database.
//! Used as the last country signal when no CDN header is present.

use crate::domain::entities::GeoInfo;
use crate::domain::ports::GeoResolver;
use maxminddb::Reader;
use serde::Deserialize;
use std::net::IpAddr;
use std::sync::Arc;

/// MaxMind GeoIP resolver.
pub struct MaxMindGeoResolver {
    reader: Arc<Reader<Vec<u8>>>,
}

impl MaxMindGeoResolver {
    /// Load a GeoIP database from a file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }

    /// Load a GeoIP database from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> anyhow::Result<Self> {
        let reader = Reader::from_source(bytes)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }
}

impl GeoResolver for MaxMindGeoResolver {
    fn resolve(&self, ip: IpAddr) -> Option<GeoInfo> {
        #[derive(Debug, Deserialize)]
        struct Country {
            iso_code: Option<String>,
        }

        #[derive(Debug, Deserialize)]
        struct CountryResp {
            country: Option<Country>,
        }

        let resp: CountryResp = self.reader.lookup(ip).ok()?;
        let iso = resp.country?.iso_code?;

        Some(GeoInfo::new(iso))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_nonexistent() {
        let result = MaxMindGeoResolver::from_file("/nonexistent/path/GeoLite2.mmdb");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let result = MaxMindGeoResolver::from_bytes(b"not a maxmind database".to_vec());
        assert!(result.is_err());
    }

    #[test]
    fn test_resolver_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MaxMindGeoResolver>();
    }
}
