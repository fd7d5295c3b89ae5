//! Gateway error types.
//!
//! Every rejection caused by client-supplied init-data becomes an HTTP 401
//! with a fixed body. The underlying [`RejectionKind`] is only ever logged,
//! so callers cannot tell a forged payload from an expired one.
//!
//! [`RejectionKind`]: ma_01_init_data::RejectionKind

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::config::ConfigError;

/// Authentication failures surfaced to HTTP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// `POST /api/telegram/validate` could not validate the submitted payload
    InvalidInitData,
    /// Authenticated route called without the init-data header
    MissingHeader,
    /// Authenticated route called with init-data that failed validation
    InvalidAuth,
}

impl AuthRejection {
    fn body(self) -> serde_json::Value {
        match self {
            Self::InvalidInitData => json!({ "valid": false, "error": "Invalid init data" }),
            Self::MissingHeader => json!({ "error": "No auth" }),
            Self::InvalidAuth => json!({ "error": "Invalid auth" }),
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::UNAUTHORIZED, Json(self.body())).into_response();
        response.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static("tma"),
        );
        response
    }
}

/// Gateway-level errors (startup and serving, never sent to clients)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Credential variable unset or empty
    #[error("missing platform credential: set {0}")]
    MissingCredential(&'static str),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Server failed while running
    #[error("server error: {0}")]
    Server(String),
}
