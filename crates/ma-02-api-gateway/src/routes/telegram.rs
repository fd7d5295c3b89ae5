use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use ma_01_init_data::{InitDataVerificationApi, WebAppUser};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::AppState;
use crate::domain::error::AuthRejection;

/// Request body for `POST /api/telegram/validate`.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    #[serde(rename = "initData")]
    pub init_data: String,
}

/// Response body for a payload that passed validation.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub user: Option<WebAppUser>,
}

/// `POST /api/telegram/validate`
///
/// Validates init-data submitted in the body and returns the signed user.
/// Unreadable bodies get the same 401 as forged payloads.
pub async fn validate(
    State(state): State<AppState>,
    body: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidateResponse>, AuthRejection> {
    let Json(body) = body.map_err(|e| {
        warn!(kind = "malformed_body", status = e.status().as_u16(), "Validate request rejected");
        AuthRejection::InvalidInitData
    })?;

    let claims = state
        .verifier
        .validate(&body.init_data, state.max_age)
        .map_err(|e| {
            warn!(kind = %e.kind(), "Init data rejected");
            AuthRejection::InvalidInitData
        })?;

    Ok(Json(ValidateResponse {
        valid: true,
        user: claims.user,
    }))
}
