//! Configuration loading and representation.
//!
//! Everything comes from environment variables. Missing values fall back to
//! development defaults; malformed values are rejected.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog_store::SiteUrls;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_SITE_URL: &str = "http://localhost:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration of the catalog service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `CATALOG_BIND_ADDR`
    pub bind_addr: SocketAddr,
    /// `CATALOG_SITE_URL` and `CATALOG_MEDIA_URL`
    pub urls: SiteUrls,
    /// `CATALOG_FIXTURE`: JSON seed for the in-memory catalog.
    pub fixture: Option<PathBuf>,
    /// `CATALOG_COMMERCE_ACTIVE`: readiness reported by the in-memory platform.
    pub commerce_active: bool,
    /// `DATABASE_URL`: selects the Postgres catalog when built with `postgres`.
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map here).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = get("CATALOG_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "CATALOG_BIND_ADDR",
                value: bind_raw.clone(),
                reason: e.to_string(),
            })?;

        let site_url = match get("CATALOG_SITE_URL") {
            Some(url) => url,
            None => {
                tracing::warn!("CATALOG_SITE_URL not set; using {DEFAULT_SITE_URL}");
                DEFAULT_SITE_URL.to_string()
            }
        };
        ensure_http_url("CATALOG_SITE_URL", &site_url)?;

        let media_url = get("CATALOG_MEDIA_URL");
        if let Some(media_url) = &media_url {
            ensure_http_url("CATALOG_MEDIA_URL", media_url)?;
        }
        let urls = match media_url {
            Some(media_url) => SiteUrls::new(site_url, media_url),
            None => SiteUrls::with_default_media(site_url),
        };

        let commerce_active = match get("CATALOG_COMMERCE_ACTIVE") {
            Some(raw) => parse_bool("CATALOG_COMMERCE_ACTIVE", &raw)?,
            None => true,
        };

        Ok(Self {
            bind_addr,
            urls,
            fixture: get("CATALOG_FIXTURE").map(PathBuf::from),
            commerce_active,
            database_url: get("DATABASE_URL"),
        })
    }
}

fn ensure_http_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected an http(s) URL".to_string(),
        })
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(cfg.urls.site_url(), DEFAULT_SITE_URL);
        assert_eq!(cfg.urls.media_url(), "http://localhost:8080/wp-content/uploads");
        assert!(cfg.commerce_active);
        assert_eq!(cfg.fixture, None);
        assert_eq!(cfg.database_url, None);
    }

    #[test]
    fn explicit_values_are_used() {
        let cfg = config(&[
            ("CATALOG_BIND_ADDR", "127.0.0.1:9000"),
            ("CATALOG_SITE_URL", "https://shop.test/"),
            ("CATALOG_MEDIA_URL", "https://cdn.shop.test/media"),
            ("CATALOG_FIXTURE", "fixtures/catalog.json"),
            ("CATALOG_COMMERCE_ACTIVE", "off"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.urls.site_url(), "https://shop.test");
        assert_eq!(cfg.urls.media_url(), "https://cdn.shop.test/media");
        assert_eq!(cfg.fixture, Some(PathBuf::from("fixtures/catalog.json")));
        assert!(!cfg.commerce_active);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[("CATALOG_BIND_ADDR", "  "), ("DATABASE_URL", "")]).unwrap();
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(cfg.database_url, None);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = config(&[("CATALOG_BIND_ADDR", "localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "CATALOG_BIND_ADDR", .. }));

        let err = config(&[("CATALOG_COMMERCE_ACTIVE", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "CATALOG_COMMERCE_ACTIVE", .. }));

        let err = config(&[("CATALOG_SITE_URL", "shop.test")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "CATALOG_SITE_URL", .. }));
    }
}
