//! Muting endpoints.

use axum::{Json, Router, extract::State, routing::post};
use gymhub_common::AppResult;
use gymhub_core::MuteInput;
use gymhub_db::entities::user_mute;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Unmute user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmuteUserRequest {
    pub user_id: String,
}

/// Muting response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MuteResponse {
    pub id: String,
    pub created_at: String,
    pub muted_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl From<user_mute::Model> for MuteResponse {
    fn from(m: user_mute::Model) -> Self {
        Self {
            id: m.id,
            created_at: m.created_at.to_rfc3339(),
            muted_id: m.muted_id,
            expires_at: m.expires_at.map(|e| e.to_rfc3339()),
        }
    }
}

/// Mute a user.
async fn mute_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<MuteInput>,
) -> AppResult<ApiResponse<MuteResponse>> {
    let mute = state.moderation_service.mute(&user.id, input).await?;
    Ok(ApiResponse::ok(mute.into()))
}

/// Unmute a user.
async fn unmute_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UnmuteUserRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .moderation_service
        .unmute(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mute", post(mute_user))
        .route("/unmute", post(unmute_user))
}
