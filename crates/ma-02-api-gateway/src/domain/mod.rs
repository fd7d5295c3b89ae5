//! Gateway domain: configuration and error types.

pub mod config;
pub mod error;

pub use config::{
    load_credential, AuthConfig, ConfigError, CorsConfig, GatewayConfig, HttpConfig,
    LimitsConfig, TimeoutConfig, CREDENTIAL_ENV, DEFAULT_AUTH_HEADER,
};
pub use error::{AuthRejection, GatewayError};
