//! # API Gateway (MA-02)
//!
//! HTTP front door for mini-app backends. Every identity claim that reaches
//! a handler has passed init-data verification in `ma-01-init-data`.
//!
//! ## Endpoints
//!
//! | Route | Auth | Success |
//! |---|---|---|
//! | `POST /api/telegram/validate` | init-data in JSON body | `{ "valid": true, "user": ... }` |
//! | `GET /api/user/profile` | init-data in `X-Telegram-Init-Data` | `{ "profile": ... }` |
//! | `GET /health` | none | `{ "status": "ok" }` |
//!
//! Every verification failure answers 401 with a fixed body. Whether the
//! payload was malformed, forged or stale is only visible in operator logs.
//!
//! ## Configuration
//!
//! See [`GatewayConfig`]. The bot token is read from `TELEGRAM_BOT_TOKEN`
//! and is never part of the serializable configuration.

pub mod domain;
pub mod middleware;
pub mod routes;
pub mod service;

pub use domain::config::{load_credential, GatewayConfig, CREDENTIAL_ENV};
pub use domain::error::{AuthRejection, GatewayError};
pub use middleware::{InitDataAuthLayer, VerifiedInitData};
pub use routes::AppState;
pub use service::{shutdown_signal, GatewayService};
