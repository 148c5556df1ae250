use crate::domain::value_objects::Environment;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // HTTP edge
    pub listen_addr: String,
    pub upstream_url: Option<String>,
    pub default_origin: String,
    pub environment: Environment,
    pub debug: bool,

    // Country catalog
    pub catalog_url: Option<String>,
    pub catalog_timeout_ms: u64,

    // GeoIP
    pub geoip_path: Option<String>,

    // Password reset tokens
    pub token_db_path: String,
    pub reset_token_ttl_secs: u64,
    pub token_gc_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            upstream_url: None,
            default_origin: "*".to_string(),
            environment: Environment::Development,
            debug: false,
            catalog_url: None,
            catalog_timeout_ms: 3000,
            geoip_path: None,
            token_db_path: "reset_tokens.db".to_string(),
            reset_token_ttl_secs: 3600,
            token_gc_interval_secs: 300,
        }
    }
}

impl Config {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_addr.trim().is_empty() {
            return Err(ConfigError::MissingListenAddr);
        }
        if self.catalog_timeout_ms == 0 {
            return Err(ConfigError::ZeroCatalogTimeout);
        }
        if self.reset_token_ttl_secs == 0 {
            return Err(ConfigError::ZeroTokenTtl);
        }
        if self.token_gc_interval_secs == 0 {
            return Err(ConfigError::ZeroGcInterval);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("listen_addr is required")]
    MissingListenAddr,
    #[error("catalog_timeout_ms must be greater than zero")]
    ZeroCatalogTimeout,
    #[error("reset_token_ttl_secs must be greater than zero")]
    ZeroTokenTtl,
    #[error("token_gc_interval_secs must be greater than zero")]
    ZeroGcInterval,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn load_config() -> anyhow::Result<Config> {
    let listen_addr = std::env::var("STOREFRONT_LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let upstream_url = non_empty_var("STOREFRONT_UPSTREAM_URL");

    let default_origin = std::env::var("STOREFRONT_DEFAULT_ORIGIN")
        .unwrap_or_else(|_| "*".to_string());

    let environment = std::env::var("STOREFRONT_ENV")
        .map(|v| Environment::from_str(&v))
        .unwrap_or_default();

    let debug = std::env::var("DEBUG").is_ok();

    let catalog_url = non_empty_var("STOREFRONT_CATALOG_URL");

    let catalog_timeout_ms = std::env::var("STOREFRONT_CATALOG_TIMEOUT_MS")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    let geoip_path = non_empty_var("STOREFRONT_GEOIP_PATH");

    let token_db_path = std::env::var("STOREFRONT_TOKEN_DB_PATH")
        .unwrap_or_else(|_| "reset_tokens.db".to_string());

    let reset_token_ttl_secs = std::env::var("STOREFRONT_RESET_TOKEN_TTL_SECS")
        .unwrap_or_else(|_| "3600".to_string())
        .parse()
        .unwrap_or(3600);

    let token_gc_interval_secs = std::env::var("STOREFRONT_TOKEN_GC_INTERVAL_SECS")
        .unwrap_or_else(|_| "300".to_string())
        .parse()
        .unwrap_or(300);

    let cfg = Config {
        listen_addr,
        upstream_url,
        default_origin,
        environment,
        debug,
        catalog_url,
        catalog_timeout_ms,
        geoip_path,
        token_db_path,
        reset_token_ttl_secs,
        token_gc_interval_secs,
    };
    cfg.validate()?;
    Ok(cfg)
}
