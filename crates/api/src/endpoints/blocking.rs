//! Blocking endpoints.

use axum::{Json, Router, extract::State, routing::post};
use gymhub_common::AppResult;
use gymhub_core::BlockInput;
use gymhub_db::entities::user_block;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Unblock request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnblockRequest {
    pub user_id: String,
}

/// Block response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockResponse {
    pub id: String,
    pub created_at: String,
    pub blocked_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<user_block::Model> for BlockResponse {
    fn from(b: user_block::Model) -> Self {
        Self {
            id: b.id,
            created_at: b.created_at.to_rfc3339(),
            blocked_id: b.blocked_id,
            reason: b.reason,
        }
    }
}

/// Block a user.
async fn block(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<BlockInput>,
) -> AppResult<ApiResponse<BlockResponse>> {
    let block = state.moderation_service.block(&user.id, input).await?;
    Ok(ApiResponse::ok(block.into()))
}

/// Unblock a user.
async fn unblock(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UnblockRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .moderation_service
        .unblock(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/block", post(block))
        .route("/unblock", post(unblock))
}
