//! Storefront Edge HTTP Server
//!
//! Fronts the storefront renderer. Page requests go through the locale
//! policy (root geo-redirect, debug headers), `/api/*` requests get CORS
//! headers and the edge's own endpoints, and everything else is forwarded
//! to the upstream renderer.

use crate::application::{LocaleRequest, LocaleService};
use crate::domain::ports::ResetTokenStore;
use crate::domain::services::{classify_route, RouteScope};
use crate::domain::value_objects::Environment;
use crate::infrastructure::ShutdownController;
use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Largest request body forwarded upstream.
const MAX_FORWARD_BODY_BYTES: usize = 10 * 1024 * 1024;

const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";
const CORS_MAX_AGE: &str = "86400";

const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Geo lookup response.
#[derive(Debug, Serialize, Deserialize)]
pub struct GeoResponse {
    pub ip: String,
    pub country: String,
    pub segment: String,
    pub supported: Vec<String>,
}

/// Password reset request body.
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

/// Password reset verification body.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
}

/// Renderer the edge forwards page traffic to.
#[derive(Clone)]
pub struct Upstream {
    base_url: String,
    client: reqwest::Client,
}

impl Upstream {
    /// Create an upstream; redirects from the renderer are passed back, not followed.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn forward(&self, req: Request) -> anyhow::Result<Response> {
        let (parts, body) = req.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|p| p.as_str())
            .unwrap_or("/");
        let url = format!("{}{}", self.base_url, path_and_query);

        let method = reqwest::Method::from_bytes(parts.method.as_str().as_bytes())?;
        let body = axum::body::to_bytes(body, MAX_FORWARD_BODY_BYTES).await?;

        let mut builder = self.client.request(method, &url);
        for (name, value) in parts.headers.iter() {
            if is_hop_by_hop(name.as_str()) || name == header::HOST || name == header::CONTENT_LENGTH
            {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_bytes());
        }

        let upstream = builder.body(body.to_vec()).send().await?;

        let status = StatusCode::from_u16(upstream.status().as_u16())?;
        let mut response = axum::http::Response::builder().status(status);
        for (name, value) in upstream.headers().iter() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            response = response.header(name.as_str(), value.as_bytes());
        }
        let bytes = upstream.bytes().await?;
        Ok(response.body(Body::from(bytes))?)
    }
}

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Shared state of the edge.
#[derive(Clone)]
pub struct EdgeState {
    pub locale: Arc<LocaleService>,
    pub tokens: Arc<dyn ResetTokenStore>,
    pub upstream: Option<Upstream>,
    /// `Access-Control-Allow-Origin` when the request has no `Origin`
    pub default_origin: String,
    pub reset_token_ttl: Duration,
    pub environment: Environment,
}

impl EdgeState {
    pub fn new(
        locale: Arc<LocaleService>,
        tokens: Arc<dyn ResetTokenStore>,
        upstream: Option<Upstream>,
        default_origin: String,
        reset_token_ttl: Duration,
        environment: Environment,
    ) -> Self {
        Self {
            locale,
            tokens,
            upstream,
            default_origin,
            reset_token_ttl,
            environment,
        }
    }
}

/// Build the edge router.
///
/// `/health` sits outside the locale middleware so probes never hit the catalog.
pub fn router(state: EdgeState) -> Router {
    Router::new()
        .route("/api/geo", get(geo_handler))
        .route("/api/password-reset/request", post(reset_request_handler))
        .route("/api/password-reset/verify", post(reset_verify_handler))
        .fallback(upstream_handler)
        .layer(middleware::from_fn_with_state(state.clone(), locale_middleware))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP server for the storefront edge.
pub struct HttpServer {
    listen_addr: String,
    state: EdgeState,
}

impl HttpServer {
    pub fn new(listen_addr: String, state: EdgeState) -> Self {
        Self { listen_addr, state }
    }

    /// Run until the shutdown controller fires.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub async fn run(&self, shutdown: ShutdownController) -> anyhow::Result<()> {
        let app = router(self.state.clone());

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("storefront edge listening on {}", self.listen_addr);

        let mut shutdown_rx = shutdown.subscribe();
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await?;

        tracing::info!("storefront edge stopped");
        Ok(())
    }
}

fn connection_ip(req: &Request) -> Option<IpAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

/// Set the CORS headers used on every `/api/*` response.
pub fn apply_cors_headers(headers: &mut HeaderMap, origin: Option<&str>, default_origin: &str) {
    let allow_origin = origin
        .and_then(|o| HeaderValue::from_str(o).ok())
        .or_else(|| HeaderValue::from_str(default_origin).ok())
        .unwrap_or_else(|| HeaderValue::from_static("*"));

    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(CORS_MAX_AGE),
    );
}

async fn locale_middleware(State(state): State<EdgeState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();

    match classify_route(&path) {
        RouteScope::Excluded => next.run(req).await,
        RouteScope::Api => {
            let origin = req
                .headers()
                .get(header::ORIGIN)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            let mut response = if req.method() == Method::OPTIONS {
                StatusCode::NO_CONTENT.into_response()
            } else {
                next.run(req).await
            };
            apply_cors_headers(response.headers_mut(), origin.as_deref(), &state.default_origin);
            response
        }
        RouteScope::Page => {
            let query = req.uri().query().map(str::to_string);
            let connection_ip = connection_ip(&req);
            let (parts, body) = req.into_parts();

            let outcome = state
                .locale
                .evaluate(LocaleRequest {
                    path: &path,
                    query: query.as_deref(),
                    headers: &parts.headers,
                    connection_ip,
                })
                .await;

            let mut response = if outcome.decision.should_redirect {
                Redirect::temporary(&outcome.decision.target_path).into_response()
            } else {
                next.run(Request::from_parts(parts, body)).await
            };

            if state.locale.debug_enabled(query.as_deref()) {
                let headers = response.headers_mut();
                for (name, value) in outcome.debug_headers() {
                    if let Ok(value) = HeaderValue::from_str(&value) {
                        headers.insert(HeaderName::from_static(name), value);
                    }
                }
            }
            response
        }
    }
}

// Handler functions

async fn health_handler(State(state): State<EdgeState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.environment.to_string(),
    })
}

async fn geo_handler(
    State(state): State<EdgeState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let connection_ip = connect.map(|ConnectInfo(addr)| addr.ip());
    let (signal, catalog, segment) = state.locale.detect(&headers, connection_ip).await;

    Json(GeoResponse {
        ip: signal.ip,
        country: signal.iso_country,
        segment,
        supported: catalog.iter().map(str::to_string).collect(),
    })
}

async fn reset_request_handler(
    State(state): State<EdgeState>,
    Json(req): Json<ResetRequest>,
) -> impl IntoResponse {
    let email = req.email.trim();
    if email.is_empty() || !email.contains('@') {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "a valid email is required" })),
        );
    }

    match state.tokens.issue(email, state.reset_token_ttl).await {
        Ok(token) => {
            tracing::info!("issued password reset token");
            if !state.environment.is_production() {
                tracing::debug!("reset token for {}: {}", token.email, token.token);
            }
            (
                StatusCode::ACCEPTED,
                Json(serde_json::json!({ "accepted": true })),
            )
        }
        Err(e) => {
            tracing::error!("failed to issue reset token: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "could not issue token" })),
            )
        }
    }
}

async fn reset_verify_handler(
    State(state): State<EdgeState>,
    Json(req): Json<VerifyRequest>,
) -> impl IntoResponse {
    match state.tokens.consume(&req.token).await {
        Ok(Some(email)) => (StatusCode::OK, Json(serde_json::json!({ "email": email }))),
        Ok(None) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "invalid or expired token" })),
        ),
        Err(e) => {
            tracing::error!("failed to verify reset token: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "could not verify token" })),
            )
        }
    }
}

async fn upstream_handler(State(state): State<EdgeState>, req: Request) -> Response {
    let Some(upstream) = &state.upstream else {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    };

    let uri = req.uri().clone();
    match upstream.forward(req).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("upstream error for {}: {:?}", uri, e);
            (StatusCode::BAD_GATEWAY, "bad gateway").into_response()
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_cors_echoes_origin() {
        let mut headers = HeaderMap::new();
        apply_cors_headers(&mut headers, Some("https://shop.example.com"), "*");
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://shop.example.com"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
            "Content-Type, Authorization"
        );
        assert_eq!(headers.get(header::ACCESS_CONTROL_MAX_AGE).unwrap(), "86400");
    }

    #[test]
    fn test_cors_uses_default_origin() {
        let mut headers = HeaderMap::new();
        apply_cors_headers(&mut headers, None, "https://default.example.com");
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://default.example.com"
        );
    }

    #[test]
    fn test_cors_invalid_default_falls_back_to_wildcard() {
        let mut headers = HeaderMap::new();
        apply_cors_headers(&mut headers, None, "bad\nvalue");
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    }

    #[test]
    fn test_hop_by_hop() {
        assert!(is_hop_by_hop("Connection"));
        assert!(is_hop_by_hop("transfer-encoding"));
        assert!(!is_hop_by_hop("content-type"));
        assert!(!is_hop_by_hop("cookie"));
    }

    #[test]
    fn test_upstream_trims_trailing_slash() {
        let upstream = Upstream::new("http://renderer:3001/", Duration::from_secs(1)).unwrap();
        assert_eq!(upstream.base_url, "http://renderer:3001");
    }
}
