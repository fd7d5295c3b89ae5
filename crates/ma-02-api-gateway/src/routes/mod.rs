//! HTTP route handlers.
//!
//! - `GET /health`
//! - `POST /api/telegram/validate`
//! - `GET /api/user/profile` (behind `InitDataAuthLayer`)

pub mod health;
pub mod telegram;
pub mod user;

use axum::{
    routing::{get, post},
    Router,
};
use ma_01_init_data::InitDataVerificationApi;
use std::sync::Arc;

use crate::middleware::InitDataAuthLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn InitDataVerificationApi>,
    /// Freshness window applied to every validation
    pub max_age: Option<u64>,
}

/// Routes without global middleware. `auth` guards the user routes only.
pub fn routes(state: AppState, auth: InitDataAuthLayer) -> Router {
    let user_routes = Router::new()
        .route("/api/user/profile", get(user::profile))
        .route_layer(auth);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/telegram/validate", post(telegram::validate))
        .with_state(state)
        .merge(user_routes)
}
