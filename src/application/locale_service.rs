//! Locale Service - Main application use case
//!
//! Runs the per-request locale pipeline:
//! header extraction -> catalog fetch -> segment resolution -> redirect decision.
//! Each request takes its own catalog snapshot; nothing is shared between requests.

use crate::domain::entities::{GeoSignal, RedirectDecision};
use crate::domain::ports::{CountryCatalog, GeoResolver};
use crate::domain::services::header_extraction::{self, RawGeoHeaders};
use crate::domain::services::{decide, resolve_segment};
use crate::domain::value_objects::{Catalog, Environment};
use axum::http::HeaderMap;
use std::net::IpAddr;
use std::sync::Arc;

/// Query parameter that forces geo debug headers on, even in production.
pub const DEBUG_QUERY_PARAM: &str = "debug_geo";

/// Inputs of the pipeline, borrowed from the HTTP request.
#[derive(Debug, Clone, Copy)]
pub struct LocaleRequest<'a> {
    pub path: &'a str,
    /// Raw query string without the leading `?`
    pub query: Option<&'a str>,
    pub headers: &'a HeaderMap,
    /// Socket peer address, if known
    pub connection_ip: Option<IpAddr>,
}

/// Everything the pipeline computed for one request.
#[derive(Debug, Clone)]
pub struct LocaleOutcome {
    pub signal: GeoSignal,
    pub raw: RawGeoHeaders,
    pub catalog: Catalog,
    pub segment: String,
    pub decision: RedirectDecision,
}

impl LocaleOutcome {
    /// Diagnostic `x-geo-*` response headers.
    pub fn debug_headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("x-geo-ip", self.signal.ip.clone()),
            ("x-geo-redirect", self.decision.reason.to_string()),
            ("x-geo-country-iso", self.signal.iso_country.clone()),
            ("x-geo-segment", self.segment.clone()),
            ("x-geo-supported", self.catalog.joined()),
        ];
        if let Some(v) = &self.raw.cf_ipcountry {
            headers.push(("x-geo-cf-ipcountry", v.clone()));
        }
        if let Some(v) = &self.raw.vercel_country {
            headers.push(("x-geo-vercel-country", v.clone()));
        }
        if let Some(v) = &self.raw.forwarded_for {
            headers.push(("x-geo-raw-xff", v.clone()));
        }
        headers
    }
}

/// Locale service - orchestrates the locale policy for the HTTP edge.
pub struct LocaleService {
    catalog: Arc<dyn CountryCatalog>,
    geo_resolver: Option<Arc<dyn GeoResolver>>,
    environment: Environment,
    debug: bool,
}

impl LocaleService {
    /// Create a new locale service.
    pub fn new(
        catalog: Arc<dyn CountryCatalog>,
        geo_resolver: Option<Arc<dyn GeoResolver>>,
        environment: Environment,
        debug: bool,
    ) -> Self {
        Self {
            catalog,
            geo_resolver,
            environment,
            debug,
        }
    }

    /// Whether debug headers should be attached to this response.
    ///
    /// On outside production, when `DEBUG` is set, or when the request
    /// carries `debug_geo=1`.
    pub fn debug_enabled(&self, query: Option<&str>) -> bool {
        !self.environment.is_production() || self.debug || query_requests_debug(query)
    }

    /// Extract the geo signal, consulting the GeoIP resolver last.
    pub fn extract_signal(&self, headers: &HeaderMap, connection_ip: Option<IpAddr>) -> GeoSignal {
        header_extraction::extract_signal(headers, connection_ip, |ip| {
            let resolver = self.geo_resolver.as_ref()?;
            let ip: IpAddr = ip.parse().ok()?;
            resolver.resolve(ip).map(|geo| geo.country)
        })
    }

    /// Detect the visitor's country and matching segment, without a redirect decision.
    pub async fn detect(
        &self,
        headers: &HeaderMap,
        connection_ip: Option<IpAddr>,
    ) -> (GeoSignal, Catalog, String) {
        let signal = self.extract_signal(headers, connection_ip);
        let catalog = self.catalog.active_segments().await;
        let segment = resolve_segment(&signal.iso_country, &catalog);
        (signal, catalog, segment)
    }

    /// Run the full pipeline for a page request.
    pub async fn evaluate(&self, req: LocaleRequest<'_>) -> LocaleOutcome {
        let (signal, catalog, segment) = self.detect(req.headers, req.connection_ip).await;
        let decision = decide(req.path, req.query, &catalog, &segment);

        tracing::debug!(
            "locale path={} ip={} iso={} segment={} redirect={} reason={}",
            req.path,
            signal.ip,
            signal.iso_country,
            segment,
            decision.should_redirect,
            decision.reason
        );

        LocaleOutcome {
            signal,
            raw: RawGeoHeaders::from_headers(req.headers),
            catalog,
            segment,
            decision,
        }
    }
}

fn query_requests_debug(query: Option<&str>) -> bool {
    let Some(query) = query else {
        return false;
    };
    query.split('&').any(|pair| {
        let mut kv = pair.splitn(2, '=');
        let key = kv.next().unwrap_or("");
        let value = kv.next().unwrap_or("");
        key == DEBUG_QUERY_PARAM && matches!(value, "1" | "true")
    })
}
