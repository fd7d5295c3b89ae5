use axum::{Extension, Json};
use ma_01_init_data::{WebAppChat, WebAppUser};
use serde::Serialize;
use tracing::warn;

use crate::domain::error::AuthRejection;
use crate::middleware::VerifiedInitData;

/// Profile assembled from verified claims.
#[derive(Debug, Serialize)]
pub struct Profile {
    pub user: WebAppUser,
    pub chat: Option<WebAppChat>,
    pub chat_type: Option<String>,
    pub start_param: Option<String>,
    pub auth_date: Option<u64>,
}

/// Response body for `GET /api/user/profile`.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
}

/// `GET /api/user/profile`
///
/// Only reachable behind `InitDataAuthLayer`, which supplies the claims.
/// Signed payloads without a `user` field carry no identity and are refused.
pub async fn profile(
    Extension(verified): Extension<VerifiedInitData>,
) -> Result<Json<ProfileResponse>, AuthRejection> {
    let claims = verified.claims();
    let Some(user) = claims.user.clone() else {
        warn!(kind = "missing_user", "Profile request rejected");
        return Err(AuthRejection::InvalidAuth);
    };

    Ok(Json(ProfileResponse {
        profile: Profile {
            user,
            chat: claims.chat.clone(),
            chat_type: claims.chat_type.clone(),
            start_param: claims.start_param.clone(),
            auth_date: claims.auth_date,
        },
    }))
}
