//! Admin configuration loaded from environment variables.
//!
//! Every variable is optional:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `ADMIN_HOST` | `127.0.0.1` | Bind address |
//! | `ADMIN_PORT` | `3001` | Listen port |
//! | `ADMIN_BASE_URL` | `http://localhost:{port}` | Public URL; `https://` turns on secure cookies |
//! | `PRODUCTS_API_URL` | `http://localhost:5000/api/products` | Products collection |
//! | `LOG_FORMAT` | text | `json` for structured logs |
//! | `SENTRY_DSN` | unset | Enables error tracking |
//! | `SENTRY_ENVIRONMENT` | unset | Environment tag |
//! | `SENTRY_SAMPLE_RATE` | `1.0` | Error sample rate |
//! | `SENTRY_TRACES_SAMPLE_RATE` | `1.0` | Trace sample rate |
//! | `ADMIN_TLS_CERT` / `ADMIN_TLS_KEY` | unset | PEM pair; both or neither |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_PRODUCTS_API_URL: &str = "http://localhost:5000/api/products";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingEnvVar(String),
    #[error("{0} is invalid: {1}")]
    InvalidEnvVar(String, String),
}

/// Settings for the admin binary.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Where operators reach the panel.
    pub base_url: String,
    /// Collection URL of the products REST API.
    pub products_api_url: Url,
    pub json_logs: bool,
    /// Error tracking, when `SENTRY_DSN` is set.
    pub sentry: Option<SentryConfig>,
    /// Serve HTTPS directly instead of plain HTTP.
    pub tls: Option<TlsConfig>,
}

/// Sentry client settings.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    pub dsn: String,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl SentryConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(dsn) = optional_env("SENTRY_DSN") else {
            return Ok(None);
        };

        Ok(Some(Self {
            dsn,
            environment: optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: sample_rate("SENTRY_SAMPLE_RATE")?,
            traces_sample_rate: sample_rate("SENTRY_TRACES_SAMPLE_RATE")?,
        }))
    }
}

/// Certificate and key for serving HTTPS.
#[derive(Clone)]
pub struct TlsConfig {
    pub cert_pem: String,
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &format_args!("{} bytes", self.cert_pem.len()))
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl TlsConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        match (optional_env("ADMIN_TLS_CERT"), optional_env("ADMIN_TLS_KEY")) {
            (None, None) => Ok(None),
            (Some(cert_pem), Some(key_pem)) => Ok(Some(Self {
                cert_pem,
                key_pem: SecretString::from(key_pem),
            })),
            (Some(_), None) => Err(ConfigError::MissingEnvVar("ADMIN_TLS_KEY".to_string())),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("ADMIN_TLS_CERT".to_string())),
        }
    }
}

impl AdminConfig {
    /// Read the configuration, loading a `.env` file first if there is one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to something unusable, or
    /// only half of the TLS pair is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env is normal
        let _ = dotenvy::dotenv();

        let host = parse_env("ADMIN_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?;
        let port = parse_env("ADMIN_PORT", DEFAULT_PORT)?;
        let base_url =
            optional_env("ADMIN_BASE_URL").unwrap_or_else(|| format!("http://localhost:{port}"));
        let products_api_url = parse_http_url(
            "PRODUCTS_API_URL",
            optional_env("PRODUCTS_API_URL")
                .as_deref()
                .unwrap_or(DEFAULT_PRODUCTS_API_URL),
        )?;
        let json_logs =
            optional_env("LOG_FORMAT").is_some_and(|format| format.eq_ignore_ascii_case("json"));

        Ok(Self {
            host,
            port,
            base_url,
            products_api_url,
            json_logs,
            sentry: SentryConfig::from_env()?,
            tls: TlsConfig::from_env()?,
        })
    }

    /// Configuration for a local instance talking to `products_api_url`.
    ///
    /// Binds to 127.0.0.1 with an OS-assigned port, no TLS, no Sentry.
    #[must_use]
    pub fn local(products_api_url: Url) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            base_url: "http://localhost".to_string(),
            products_api_url,
            json_logs: false,
            sentry: None,
            tls: None,
        }
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the panel is served over HTTPS (secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse `key` if set, otherwise use `default`.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// A sample rate between 0.0 and 1.0, defaulting to 1.0.
fn sample_rate(key: &str) -> Result<f32, ConfigError> {
    let rate = parse_env(key, 1.0_f32)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{rate} is outside 0.0..=1.0"),
        ))
    }
}

/// Parse an absolute http(s) URL.
fn parse_http_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn local() -> AdminConfig {
        AdminConfig::local(Url::parse(DEFAULT_PRODUCTS_API_URL).unwrap())
    }

    #[test]
    fn test_parse_http_url_accepts_http_and_https() {
        assert!(parse_http_url("X", "http://localhost:5000/api/products").is_ok());
        assert!(parse_http_url("X", "https://api.example.com/products").is_ok());
    }

    #[test]
    fn test_parse_http_url_rejects_other_input() {
        let err = parse_http_url("PRODUCTS_API_URL", "ftp://example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "PRODUCTS_API_URL"));
        assert!(parse_http_url("X", "not a url").is_err());
    }

    #[test]
    fn test_default_products_api_url_parses() {
        let url = parse_http_url("X", DEFAULT_PRODUCTS_API_URL).unwrap();
        assert_eq!(url.path(), "/api/products");
    }

    #[test]
    fn test_unset_variable_uses_default() {
        let port = parse_env("CATALOG_ADMIN_TEST_UNSET_PORT", DEFAULT_PORT).unwrap();
        assert_eq!(port, 3001);
        let rate = sample_rate("CATALOG_ADMIN_TEST_UNSET_RATE").unwrap();
        assert!((rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_local_binds_loopback_on_any_port() {
        let addr = local().socket_addr();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 0);
    }

    #[test]
    fn test_is_secure_follows_base_url() {
        let mut config = local();
        assert!(!config.is_secure());
        config.base_url = "https://admin.example.com".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_tls_config_debug_redacts_key() {
        let config = TlsConfig {
            cert_pem: "-----BEGIN CERTIFICATE-----".to_string(),
            key_pem: SecretString::from("super_secret_private_key"),
        };

        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super_secret_private_key"));
        assert!(!debug.contains("BEGIN CERTIFICATE"));
    }
}
