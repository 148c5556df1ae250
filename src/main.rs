//! storefront-geo - Country-aware edge for the storefront
//!
//! This is the composition root that wires together all the components.

use std::sync::Arc;
use std::time::Duration;
use storefront_geo::adapters::inbound::{EdgeState, HttpServer, Upstream};
use storefront_geo::adapters::outbound::{
    HttpCountryCatalog, MaxMindGeoResolver, SqliteResetTokenStore, StaticCountryCatalog,
};
use storefront_geo::application::LocaleService;
use storefront_geo::domain::ports::{CountryCatalog, GeoResolver};
use storefront_geo::infrastructure::{shutdown_signal, ShutdownController};
use storefront_geo::load_config;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting storefront-geo env={} listen={}",
        cfg.environment,
        cfg.listen_addr
    );

    // ===== COMPOSITION ROOT =====

    // 1. Outbound adapters

    // Country catalog (backend API, static default set when unconfigured)
    let catalog: Arc<dyn CountryCatalog> = match &cfg.catalog_url {
        Some(url) => {
            tracing::info!("country catalog from {}", url);
            Arc::new(HttpCountryCatalog::new(
                Some(url.clone()),
                Duration::from_millis(cfg.catalog_timeout_ms),
                cfg.debug,
            )?)
        }
        None => {
            tracing::warn!("STOREFRONT_CATALOG_URL not set, serving the default country set");
            Arc::new(StaticCountryCatalog::new())
        }
    };

    // GeoIP resolver (optional, consulted after the CDN headers)
    let geo_resolver: Option<Arc<dyn GeoResolver>> = match &cfg.geoip_path {
        Some(path) => match MaxMindGeoResolver::from_file(path) {
            Ok(g) => {
                tracing::info!("GeoIP DB loaded from {}", path);
                Some(Arc::new(g) as Arc<dyn GeoResolver>)
            }
            Err(e) => {
                tracing::error!("failed to load GeoIP DB from {}: {:?}", path, e);
                None
            }
        },
        None => None,
    };

    // Password reset tokens (SQLite)
    let shutdown = ShutdownController::new();
    let tokens = SqliteResetTokenStore::open(&cfg.token_db_path)?;
    tokens.start_gc(
        Duration::from_secs(cfg.token_gc_interval_secs),
        shutdown.clone(),
    );

    // Upstream renderer
    let upstream = match &cfg.upstream_url {
        Some(url) => {
            tracing::info!("forwarding pages to {}", url);
            Some(Upstream::new(url, Duration::from_secs(30))?)
        }
        None => None,
    };

    // 2. Application service
    let locale = Arc::new(LocaleService::new(
        catalog,
        geo_resolver,
        cfg.environment,
        cfg.debug,
    ));

    // 3. Inbound adapter
    let state = EdgeState::new(
        locale,
        Arc::new(tokens),
        upstream,
        cfg.default_origin.clone(),
        Duration::from_secs(cfg.reset_token_ttl_secs),
        cfg.environment,
    );
    let server = HttpServer::new(cfg.listen_addr.clone(), state);

    tokio::spawn(shutdown_signal(shutdown.clone()));

    server.run(shutdown).await
}
