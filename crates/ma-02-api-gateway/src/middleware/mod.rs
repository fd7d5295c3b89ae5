//! Middleware stack for the API Gateway.
//!
//! Layer order: Request → Tracing → CORS → Timeout → Router → [InitDataAuth] → Handler
//!
//! `InitDataAuth` is only applied to routes that need a verified user.

pub mod auth;
pub mod cors;
pub mod tracing;

pub use auth::{InitDataAuthLayer, VerifiedInitData};
pub use cors::create_cors_layer;
pub use tracing::{TracingLayer, REQUEST_ID_HEADER};
