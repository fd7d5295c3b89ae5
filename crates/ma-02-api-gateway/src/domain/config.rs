//! Gateway configuration with validation.
//!
//! Defaults suit local development. Deployments override them through
//! environment variables (see [`GatewayConfig::apply_overrides`]); the bot
//! token is loaded separately and never lives in this struct.

use axum::http::HeaderName;
use ma_01_init_data::PlatformCredential;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use super::error::GatewayError;

/// Environment variable holding the platform credential.
pub const CREDENTIAL_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Header carrying raw init-data on authenticated API calls.
pub const DEFAULT_AUTH_HEADER: &str = "x-telegram-init-data";

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Init-data authentication settings
    pub auth: AuthConfig,
    /// Request validation limits
    pub limits: LimitsConfig,
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
    /// CORS configuration
    pub cors: CorsConfig,
}

impl GatewayConfig {
    /// Defaults with environment overrides applied, then validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `MA_HTTP_HOST` | `http.host` |
    /// | `MA_HTTP_PORT` | `http.port` |
    /// | `MA_INIT_DATA_MAX_AGE` | `auth.max_age_secs` (seconds, or `off`) |
    /// | `MA_AUTH_HEADER` | `auth.header_name` |
    /// | `MA_MAX_BODY_BYTES` | `limits.max_body_bytes` |
    /// | `MA_REQUEST_TIMEOUT` | `timeouts.request` (`10s`, `500ms`, `1m`) |
    /// | `MA_CORS_ORIGINS` | `cors.allowed_origins` (comma-separated) |
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("MA_HTTP_HOST") {
            self.http.host = parse_var("MA_HTTP_HOST", &host)?;
        }
        if let Some(port) = lookup("MA_HTTP_PORT") {
            self.http.port = parse_var("MA_HTTP_PORT", &port)?;
        }
        if let Some(max_age) = lookup("MA_INIT_DATA_MAX_AGE") {
            self.auth.max_age_secs = match max_age.trim() {
                "off" | "none" => None,
                secs => Some(parse_var("MA_INIT_DATA_MAX_AGE", secs)?),
            };
        }
        if let Some(header) = lookup("MA_AUTH_HEADER") {
            self.auth.header_name = header.trim().to_ascii_lowercase();
        }
        if let Some(bytes) = lookup("MA_MAX_BODY_BYTES") {
            self.limits.max_body_bytes = parse_var("MA_MAX_BODY_BYTES", &bytes)?;
        }
        if let Some(timeout) = lookup("MA_REQUEST_TIMEOUT") {
            self.timeouts.request = humantime_serde::parse_duration(&timeout)
                .map_err(|e| ConfigError::InvalidTimeout(format!("MA_REQUEST_TIMEOUT: {e}")))?;
        }
        if let Some(origins) = lookup("MA_CORS_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Invalid("http.port cannot be 0".into()));
        }

        if HeaderName::from_bytes(self.auth.header_name.as_bytes()).is_err() {
            return Err(ConfigError::InvalidHeader(self.auth.header_name.clone()));
        }

        if self.limits.max_body_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_body_bytes cannot be 0".into(),
            ));
        }

        if self.timeouts.request.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "request timeout cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    /// CORS settings with the auth header always allowed, so browsers can
    /// send it on preflighted requests whatever `auth.header_name` is.
    pub fn effective_cors(&self) -> CorsConfig {
        let mut cors = self.cors.clone();
        let header = &self.auth.header_name;
        let listed = cors
            .allowed_headers
            .iter()
            .any(|h| h == "*" || h.eq_ignore_ascii_case(header));
        if !listed {
            cors.allowed_headers.push(header.clone());
        }
        cors
    }

    /// Parsed auth header name. Falls back to the default for an invalid
    /// name; [`validate`](Self::validate) rejects those up front.
    pub fn auth_header(&self) -> HeaderName {
        HeaderName::from_bytes(self.auth.header_name.as_bytes())
            .unwrap_or_else(|_| HeaderName::from_static(DEFAULT_AUTH_HEADER))
    }
}

/// Load the platform credential from a key lookup.
pub fn load_credential<F>(lookup: F) -> Result<PlatformCredential, GatewayError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(CREDENTIAL_ENV) {
        Some(token) if !token.trim().is_empty() => Ok(PlatformCredential::new(token.trim())),
        _ => Err(GatewayError::MissingCredential(CREDENTIAL_ENV)),
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::Invalid(format!("{name}: {e}")))
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 8080)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
        }
    }
}

/// Init-data authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Header carrying init-data on authenticated routes (lowercase)
    pub header_name: String,
    /// Freshness window in seconds (None = no expiry check)
    pub max_age_secs: Option<u64>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            header_name: DEFAULT_AUTH_HEADER.to_string(),
            max_age_secs: Some(86_400), // 24 hours
        }
    }
}

/// Request limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max request body size in bytes (default: 64KB)
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout
    #[serde(with = "humantime_serde")]
    pub request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(10),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS
    pub enabled: bool,
    /// Allowed origins ("*" for all)
    pub allowed_origins: Vec<String>,
    /// Allowed methods
    pub allowed_methods: Vec<String>,
    /// Allowed headers
    pub allowed_headers: Vec<String>,
    /// Max age for preflight cache
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()],
            allowed_headers: vec![
                "Content-Type".to_string(),
                DEFAULT_AUTH_HEADER.to_string(),
            ],
            max_age: 86400, // 24 hours
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid size limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Auth header is not a valid HTTP header name
    #[error("invalid auth header name: {0:?}")]
    InvalidHeader(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Humantime serde module for Duration serialization
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() != 0 {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        } else {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // "ms" must be checked before "s" and "m"
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .ok()
                .and_then(|m| m.checked_mul(60))
                .map(Duration::from_secs)
                .ok_or("invalid minutes")
        } else {
            // Try parsing as plain seconds
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.auth.max_age_secs, Some(86_400));
        assert_eq!(config.auth_header().as_str(), "x-telegram-init-data");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = GatewayConfig::default();
        config
            .apply_overrides(lookup(&[
                ("MA_HTTP_HOST", "127.0.0.1"),
                ("MA_HTTP_PORT", "9000"),
                ("MA_INIT_DATA_MAX_AGE", "3600"),
                ("MA_AUTH_HEADER", "X-Init-Data"),
                ("MA_MAX_BODY_BYTES", "1024"),
                ("MA_REQUEST_TIMEOUT", "500ms"),
                ("MA_CORS_ORIGINS", "https://a.example, https://b.example"),
            ]))
            .unwrap();

        assert_eq!(config.http_addr(), "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.auth.max_age_secs, Some(3600));
        assert_eq!(config.auth.header_name, "x-init-data");
        assert_eq!(config.limits.max_body_bytes, 1024);
        assert_eq!(config.timeouts.request, Duration::from_millis(500));
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_expiry_can_be_disabled() {
        let mut config = GatewayConfig::default();
        config
            .apply_overrides(lookup(&[("MA_INIT_DATA_MAX_AGE", "off")]))
            .unwrap();
        assert_eq!(config.auth.max_age_secs, None);
    }

    #[test]
    fn test_bad_override_is_an_error() {
        let mut config = GatewayConfig::default();
        assert!(matches!(
            config.apply_overrides(lookup(&[("MA_HTTP_PORT", "eighty")])),
            Err(ConfigError::Invalid(msg)) if msg.contains("MA_HTTP_PORT")
        ));
        assert!(matches!(
            config.apply_overrides(lookup(&[("MA_REQUEST_TIMEOUT", "soon")])),
            Err(ConfigError::InvalidTimeout(_))
        ));
    }

    #[test]
    fn test_effective_cors_allows_custom_auth_header() {
        let mut config = GatewayConfig::default();
        config
            .apply_overrides(lookup(&[("MA_AUTH_HEADER", "X-Init-Data")]))
            .unwrap();

        let cors = config.effective_cors();
        assert!(cors.allowed_headers.iter().any(|h| h == "x-init-data"));
        assert!(cors.allowed_headers.iter().any(|h| h == DEFAULT_AUTH_HEADER));

        // Already listed: no duplicate entry
        let default = GatewayConfig::default().effective_cors();
        assert_eq!(default.allowed_headers, CorsConfig::default().allowed_headers);
    }

    #[test]
    fn test_oversized_minutes_timeout_is_an_error() {
        let mut config = GatewayConfig::default();
        assert!(matches!(
            config.apply_overrides(lookup(&[("MA_REQUEST_TIMEOUT", "18446744073709551615m")])),
            Err(ConfigError::InvalidTimeout(_))
        ));
        assert_eq!(
            humantime_serde::parse_duration("2m"),
            Ok(Duration::from_secs(120))
        );
    }

    #[test]
    fn test_validation() {
        let mut config = GatewayConfig::default();
        config.limits.max_body_bytes = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLimit(_))));

        let mut config = GatewayConfig::default();
        config.timeouts.request = Duration::ZERO;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimeout(_))));

        let mut config = GatewayConfig::default();
        config.auth.header_name = "bad header".into();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidHeader(_))));

        let mut config = GatewayConfig::default();
        config.http.port = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_credential() {
        assert!(load_credential(lookup(&[(CREDENTIAL_ENV, "123:abc")])).is_ok());
        assert!(matches!(
            load_credential(lookup(&[(CREDENTIAL_ENV, "  ")])),
            Err(GatewayError::MissingCredential(CREDENTIAL_ENV))
        ));
        assert!(load_credential(lookup(&[])).is_err());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = GatewayConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"request\":\"10s\""));
        let back: GatewayConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.timeouts.request, config.timeouts.request);

        let partial: GatewayConfig = serde_json::from_str(r#"{"http":{"port":9999}}"#).unwrap();
        assert_eq!(partial.http.port, 9999);
        assert_eq!(partial.auth.header_name, DEFAULT_AUTH_HEADER);
    }
}
