//! Service Configuration
//!
//! All settings come from environment variables; nothing sensitive is
//! hardcoded. Required:
//!
//! - `STOCKWATCH_PLATFORM_BASE_URL`: Admin API base URL for SKU lookups
//! - `STOCKWATCH_PLATFORM_TOKEN`: Admin API access token
//!
//! Optional:
//!
//! - `STOCKWATCH_SENDGRID_KEY`: SendGrid API key; absent selects the
//!   console mailer (development mode)
//! - `STOCKWATCH_FROM_EMAIL`: alert sender address
//! - `STOCKWATCH_BIND_ALL`: set to "true" to bind 0.0.0.0 (Docker)
//!
//! Development-mode store seeds (stand-ins for the external config store):
//!
//! - `STOCKWATCH_SHOPS`, `STOCKWATCH_SKUS`, `STOCKWATCH_RECIPIENTS`
//!   (comma-separated), `STOCKWATCH_MIN_STOCK`

use std::env;
use std::net::{IpAddr, Ipv4Addr};

use tracing::{info, warn};
use url::Url;

use crate::error::ConfigError;

/// Default alert sender address
const DEFAULT_FROM_EMAIL: &str = "alerts@stockwatch.local";

/// Service configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address derived from the bind_all setting
    pub bind_addr: IpAddr,

    /// Admin API base URL for SKU lookups
    pub platform_base_url: Url,

    /// Admin API access token
    pub platform_token: String,

    /// SendGrid API key; `None` selects the console mailer
    pub sendgrid_key: Option<String>,

    /// Sender address for alert emails
    pub from_email: String,

    /// Development-mode seeds for the in-memory store
    pub seed: StoreSeed,
}

/// Development-mode seed data for the in-memory store.
///
/// In production these entities live in the external config store owned by
/// the admin UI; the seeds exist so the binary is usable standalone.
#[derive(Debug, Clone, Default)]
pub struct StoreSeed {
    /// Shop domains with installed sessions
    pub shops: Vec<String>,
    /// Monitored SKUs
    pub skus: Vec<String>,
    /// Alert recipients
    pub recipients: Vec<String>,
    /// Minimum stock threshold
    pub min_stock: Option<i64>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] when a required variable is not
    /// set and [`ConfigError::InvalidVar`] when a value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url_raw = env::var("STOCKWATCH_PLATFORM_BASE_URL")
            .map_err(|_| ConfigError::MissingVar("STOCKWATCH_PLATFORM_BASE_URL"))?;
        let platform_base_url = parse_base_url(&base_url_raw)?;

        let platform_token = env::var("STOCKWATCH_PLATFORM_TOKEN")
            .map_err(|_| ConfigError::MissingVar("STOCKWATCH_PLATFORM_TOKEN"))?;
        if platform_token.is_empty() {
            return Err(ConfigError::InvalidVar {
                var: "STOCKWATCH_PLATFORM_TOKEN",
                reason: "token cannot be empty".to_string(),
            });
        }

        let sendgrid_key = env::var("STOCKWATCH_SENDGRID_KEY").ok().filter(|k| !k.is_empty());
        if sendgrid_key.is_none() {
            warn!("STOCKWATCH_SENDGRID_KEY not set, alert emails go to the log only");
        }

        let from_email =
            env::var("STOCKWATCH_FROM_EMAIL").unwrap_or_else(|_| DEFAULT_FROM_EMAIL.to_string());

        let bind_all = env::var("STOCKWATCH_BIND_ALL")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);
        let bind_addr = if bind_all {
            warn!("Binding to 0.0.0.0 (STOCKWATCH_BIND_ALL=true)");
            IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
        } else {
            info!("Binding to localhost only (127.0.0.1)");
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
        };

        let min_stock = match env::var("STOCKWATCH_MIN_STOCK") {
            Ok(raw) => Some(raw.parse::<i64>().map_err(|e| ConfigError::InvalidVar {
                var: "STOCKWATCH_MIN_STOCK",
                reason: e.to_string(),
            })?),
            Err(_) => None,
        };

        let seed = StoreSeed {
            shops: csv_var("STOCKWATCH_SHOPS"),
            skus: csv_var("STOCKWATCH_SKUS"),
            recipients: csv_var("STOCKWATCH_RECIPIENTS"),
            min_stock,
        };

        Ok(Self {
            bind_addr,
            platform_base_url,
            platform_token,
            sendgrid_key,
            from_email,
            seed,
        })
    }

    /// Create a test configuration without touching the environment
    pub fn test_config() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            platform_base_url: Url::parse("https://test.myshopify.com/admin/api/2024-01/")
                .expect("static test URL"),
            platform_token: "test-token-for-unit-tests-only".to_string(),
            sendgrid_key: None,
            from_email: DEFAULT_FROM_EMAIL.to_string(),
            seed: StoreSeed::default(),
        }
    }
}

/// Parse the Admin API base URL, normalizing to a trailing slash.
///
/// `Url::join` treats the last path segment of a slash-less base as a file
/// and replaces it, so `.../api/2024-01` would lose the version segment on
/// every lookup. Appending the slash keeps joins purely additive.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw).map_err(|e| ConfigError::InvalidVar {
        var: "STOCKWATCH_PLATFORM_BASE_URL",
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidVar {
            var: "STOCKWATCH_PLATFORM_BASE_URL",
            reason: "URL cannot serve as a base for API paths".to_string(),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse a comma-separated environment variable into trimmed entries
fn csv_var(name: &str) -> Vec<String> {
    env::var(name)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_config() {
        let config = AppConfig::test_config();
        assert!(config.sendgrid_key.is_none());
        assert_eq!(config.from_email, DEFAULT_FROM_EMAIL);
        assert!(config
            .platform_base_url
            .as_str()
            .ends_with("/admin/api/2024-01/"));
    }

    #[test]
    fn test_base_url_gains_trailing_slash() {
        let url = parse_base_url("https://test.myshopify.com/admin/api/2024-01").unwrap();
        assert_eq!(url.as_str(), "https://test.myshopify.com/admin/api/2024-01/");
        // Joins must extend the path, never replace the version segment.
        assert_eq!(
            url.join("inventory_items/999.json").unwrap().as_str(),
            "https://test.myshopify.com/admin/api/2024-01/inventory_items/999.json"
        );
    }

    #[test]
    fn test_base_url_with_slash_is_unchanged() {
        let url = parse_base_url("https://test.myshopify.com/admin/api/2024-01/").unwrap();
        assert_eq!(url.as_str(), "https://test.myshopify.com/admin/api/2024-01/");
    }

    #[test]
    fn test_base_url_rejects_non_base_urls() {
        assert!(parse_base_url("mailto:alerts@example.com").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_csv_var_missing_is_empty() {
        assert!(csv_var("STOCKWATCH_TEST_DOES_NOT_EXIST").is_empty());
    }

    #[test]
    fn test_csv_var_trims_and_drops_empties() {
        // Env mutation is process-global; use a name no other test reads.
        std::env::set_var("STOCKWATCH_TEST_CSV", " a@x.com , ,b@x.com,");
        assert_eq!(
            csv_var("STOCKWATCH_TEST_CSV"),
            vec!["a@x.com".to_string(), "b@x.com".to_string()]
        );
        std::env::remove_var("STOCKWATCH_TEST_CSV");
    }
}
