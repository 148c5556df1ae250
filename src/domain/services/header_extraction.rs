//! Header Extraction
//!
//! Pulls the client IP and a country guess out of proxy/CDN headers.
//! Each signal is an ordered chain of extractors; the first one that
//! yields a non-empty value wins.

use crate::domain::entities::{GeoSignal, DEFAULT_COUNTRY, UNKNOWN_IP};
use axum::http::HeaderMap;
use std::net::IpAddr;

type Extractor = fn(&HeaderMap) -> Option<String>;

/// IP headers, highest priority first.
const IP_EXTRACTORS: &[Extractor] = &[
    forwarded_for,
    real_ip,
    cf_connecting_ip,
    client_ip_header,
    fastly_client_ip,
];

/// Country headers, highest priority first.
const COUNTRY_EXTRACTORS: &[Extractor] = &[
    cf_ipcountry,
    vercel_ip_country,
    geo_country,
    country_code_header,
];

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    header(headers, "x-forwarded-for").and_then(|v| {
        v.split(',')
            .next()
            .map(str::trim)
            .filter(|first| !first.is_empty())
            .map(str::to_string)
    })
}

fn real_ip(headers: &HeaderMap) -> Option<String> {
    header(headers, "x-real-ip")
}

fn cf_connecting_ip(headers: &HeaderMap) -> Option<String> {
    header(headers, "cf-connecting-ip")
}

fn client_ip_header(headers: &HeaderMap) -> Option<String> {
    header(headers, "x-client-ip")
}

fn fastly_client_ip(headers: &HeaderMap) -> Option<String> {
    header(headers, "fastly-client-ip")
}

fn cf_ipcountry(headers: &HeaderMap) -> Option<String> {
    header(headers, "cf-ipcountry")
}

fn vercel_ip_country(headers: &HeaderMap) -> Option<String> {
    header(headers, "x-vercel-ip-country")
}

fn geo_country(headers: &HeaderMap) -> Option<String> {
    header(headers, "x-geo-country")
}

fn country_code_header(headers: &HeaderMap) -> Option<String> {
    header(headers, "x-country-code")
}

/// Extract the client IP.
///
/// Falls back to the socket peer address, then to `"unknown"`.
pub fn client_ip(headers: &HeaderMap, connection_ip: Option<IpAddr>) -> String {
    IP_EXTRACTORS
        .iter()
        .find_map(|extract| extract(headers))
        .or_else(|| connection_ip.map(|ip| ip.to_string()))
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}

/// Guess the ISO country of the client, upper-cased.
///
/// `runtime_geo` is only invoked when no header carries a country, so an
/// expensive lookup (GeoIP) is skipped for CDN-fronted traffic.
pub fn detect_country_code<F>(headers: &HeaderMap, runtime_geo: F) -> String
where
    F: FnOnce() -> Option<String>,
{
    COUNTRY_EXTRACTORS
        .iter()
        .find_map(|extract| extract(headers))
        .or_else(|| {
            runtime_geo()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
        })
        .map(|c| c.to_uppercase())
        .unwrap_or_else(|| DEFAULT_COUNTRY.to_string())
}

/// Build the full geo signal for a request.
pub fn extract_signal<F>(headers: &HeaderMap, connection_ip: Option<IpAddr>, runtime_geo: F) -> GeoSignal
where
    F: FnOnce(&str) -> Option<String>,
{
    let ip = client_ip(headers, connection_ip);
    let iso_country = detect_country_code(headers, || runtime_geo(&ip));
    GeoSignal::new(ip, iso_country)
}

/// Raw header values echoed back in debug mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGeoHeaders {
    pub cf_ipcountry: Option<String>,
    pub vercel_country: Option<String>,
    pub forwarded_for: Option<String>,
}

impl RawGeoHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            cf_ipcountry: header(headers, "cf-ipcountry"),
            vercel_country: header(headers, "x-vercel-ip-country"),
            forwarded_for: header(headers, "x-forwarded-for"),
        }
    }
}
