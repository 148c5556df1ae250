//! HTTP Country Catalog
//!
//! Implements CountryCatalog against the storefront backend's
//! `/api/countries` endpoint. Every failure degrades to the static
//! default set; nothing is cached between calls.

use crate::domain::entities::CountryRecord;
use crate::domain::ports::CountryCatalog;
use crate::domain::value_objects::Catalog;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Body returned by the countries endpoint.
#[derive(Debug, Deserialize)]
struct CountriesResponse {
    countries: Vec<CountryRecord>,
}

/// Why a catalog fetch was rejected.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog endpoint not configured")]
    Unconfigured,
    #[error("catalog request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("catalog endpoint returned {0}")]
    Status(u16),
    #[error("malformed catalog body: {0}")]
    Malformed(String),
    #[error("catalog contains no active countries")]
    Empty,
}

/// Catalog backed by the storefront backend API.
pub struct HttpCountryCatalog {
    base_url: Option<String>,
    client: reqwest::Client,
    debug: bool,
}

impl HttpCountryCatalog {
    /// Create a catalog client with a bounded request timeout.
    ///
    /// `base_url` of `None` makes every fetch fall back immediately.
    pub fn new(base_url: Option<String>, timeout: Duration, debug: bool) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url
                .map(|u| u.trim().trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
            client,
            debug,
        })
    }

    /// Fetch active segments, surfacing the failure cause.
    pub async fn fetch(&self) -> Result<Catalog, CatalogError> {
        let base = self.base_url.as_deref().ok_or(CatalogError::Unconfigured)?;
        Self::fetch_segments(&self.client, base).await
    }

    async fn fetch_segments(client: &reqwest::Client, base: &str) -> Result<Catalog, CatalogError> {
        let url = format!("{}/api/countries", base);
        let response = client
            .get(&url)
            .query(&[
                ("isActive", "true"),
                ("sortBy", "sortOrder"),
                ("sortOrder", "asc"),
                ("limit", "100"),
            ])
            .header("cache-control", "no-store")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let data: CountriesResponse =
            serde_json::from_str(&body).map_err(|e| CatalogError::Malformed(e.to_string()))?;

        let catalog = Catalog::from_codes(
            data.countries
                .iter()
                .filter(|c| c.is_active)
                .map(|c| c.country_code.as_str()),
        );

        if catalog.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(catalog)
    }
}

#[async_trait]
impl CountryCatalog for HttpCountryCatalog {
    async fn active_segments(&self) -> Catalog {
        match self.fetch().await {
            Ok(catalog) => catalog,
            Err(e) => {
                if self.debug {
                    tracing::debug!("catalog fetch failed, using default set: {}", e);
                }
                Catalog::default_set()
            }
        }
    }
}

/// Catalog that always yields the static default set.
#[derive(Debug, Clone, Default)]
pub struct StaticCountryCatalog {
    catalog: Catalog,
}

impl StaticCountryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a fixed catalog (empty input still becomes the default set).
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            catalog: catalog.or_default(),
        }
    }
}

#[async_trait]
impl CountryCatalog for StaticCountryCatalog {
    async fn active_segments(&self) -> Catalog {
        self.catalog.clone()
    }
}
