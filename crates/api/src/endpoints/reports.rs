//! Content report endpoints.

use axum::{Json, Router, extract::State, routing::post};
use gymhub_common::AppResult;
use gymhub_core::CreateReportInput;
use gymhub_db::entities::content_report;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// File a report against a post, comment or community.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateReportInput>,
) -> AppResult<ApiResponse<content_report::Model>> {
    let report = state.report_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(report))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/create", post(create))
}
