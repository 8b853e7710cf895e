//! Direct conversation endpoints.

use axum::{Json, Router, extract::State, routing::post};
use gymhub_common::AppResult;
use gymhub_core::DirectConversation;
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Open a direct conversation with another user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectRequest {
    pub user_id: String,
}

/// Find or create the direct conversation between the caller and a user.
async fn direct(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DirectRequest>,
) -> AppResult<ApiResponse<DirectConversation>> {
    let conversation = state
        .conversation_service
        .get_or_create_direct(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(conversation))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/direct", post(direct))
}
