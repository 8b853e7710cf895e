//! Admin panel endpoints.
//!
//! Every route requires an admin session. Destructive commands go through
//! `/actions/prepare` and `/actions/confirm`; `/actions/execute` runs a
//! command directly.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::Uri,
    routing::{get, post},
};
use chrono::Utc;
use gymhub_common::{AppError, AppResult};
use gymhub_core::{
    AdminCommand, AdminSnapshot, CommandOutcome, ConfirmationPrompt, ModerationStatus, Tab,
    admin::{OpenedConfirmation, TabData, TabFilter, export_filename, export_tab},
};
use gymhub_db::entities::{
    community_member, content_report, gym_request_history, user_suspension,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::info;

use crate::{
    extractors::AdminUser,
    middleware::AppState,
    response::{ApiResponse, CsvDownload},
};

/// Load one tab request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRequest {
    pub tab: Tab,
}

/// Confirm a pending command.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub token: String,
    /// Reload the tabs the command touched.
    #[serde(default)]
    pub reload: bool,
}

/// Run a command without confirmation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub command: AdminCommand,
    #[serde(default)]
    pub reload: bool,
}

/// Outcome of a command, with the refreshed tabs when requested.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub outcome: CommandOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reloaded: Vec<TabData>,
}

/// Cancel response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    pub cancelled: bool,
}

/// Pending confirmation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingResponse {
    pub prompt: Option<ConfirmationPrompt>,
}

/// Gym request lookup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GymRequestIdRequest {
    pub request_id: String,
}

/// Community lookup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityIdRequest {
    pub community_id: String,
}

/// User lookup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdRequest {
    pub user_id: String,
}

/// Decode a tab filter from the query string.
fn query_filter<F: DeserializeOwned>(uri: &Uri) -> AppResult<F> {
    Query::<F>::try_from_uri(uri)
        .map(|Query(filter)| filter)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// The export filter for `tab`, read from the query string.
fn tab_filter(tab: Tab, uri: &Uri) -> AppResult<TabFilter> {
    Ok(match tab {
        Tab::Users => TabFilter::Users(query_filter(uri)?),
        Tab::Communities => TabFilter::Communities(query_filter(uri)?),
        Tab::Gyms => TabFilter::Gyms(query_filter(uri)?),
        Tab::GymRequests => TabFilter::GymRequests(query_filter(uri)?),
        Tab::Reports => TabFilter::Reports(query_filter(uri)?),
        Tab::Feedback => TabFilter::Feedback(query_filter(uri)?),
        Tab::Posts | Tab::Comments => {
            return Err(AppError::BadRequest(format!("Tab {tab} cannot be exported")));
        }
    })
}

/// Full admin snapshot.
async fn dashboard(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<AdminSnapshot>> {
    let snapshot = state.loader.load_all().await?;
    Ok(ApiResponse::ok(snapshot))
}

/// One tab of the snapshot.
async fn dashboard_tab(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<TabRequest>,
) -> AppResult<ApiResponse<TabData>> {
    let data = state.loader.load_tab(req.tab).await?;
    Ok(ApiResponse::ok(data))
}

/// Open a confirmation for a command.
async fn prepare(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(command): Json<AdminCommand>,
) -> AppResult<ApiResponse<OpenedConfirmation>> {
    let opened = state.confirmations.open(&admin.id, command).await;
    Ok(ApiResponse::ok(opened))
}

/// Confirm and run the pending command.
async fn confirm(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<ConfirmRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let outcome = state.confirmations.confirm(&admin.id, &req.token).await?;
    command_response(&state, outcome, req.reload).await
}

/// Drop the pending confirmation.
async fn cancel(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<CancelResponse>> {
    let cancelled = state.confirmations.cancel(&admin.id).await;
    Ok(ApiResponse::ok(CancelResponse { cancelled }))
}

/// The prompt of the pending confirmation, if any.
async fn pending(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<PendingResponse>> {
    let prompt = state.confirmations.pending(&admin.id).await;
    Ok(ApiResponse::ok(PendingResponse { prompt }))
}

/// Run a command immediately.
async fn execute(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<ExecuteRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let outcome = state
        .confirmations
        .dispatcher()
        .dispatch(&admin.id, req.command)
        .await?;
    command_response(&state, outcome, req.reload).await
}

async fn command_response(
    state: &AppState,
    outcome: CommandOutcome,
    reload: bool,
) -> AppResult<ApiResponse<CommandResponse>> {
    let reloaded = if reload {
        state.loader.load_tabs(&outcome.affected).await?
    } else {
        Vec::new()
    };
    Ok(ApiResponse::ok(CommandResponse { outcome, reloaded }))
}

/// Status history of a gym request.
async fn gym_request_history(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<GymRequestIdRequest>,
) -> AppResult<ApiResponse<Vec<gym_request_history::Model>>> {
    state.gym_request_service.get(&req.request_id).await?;
    let history = state.gym_request_service.history(&req.request_id).await?;
    Ok(ApiResponse::ok(history))
}

/// Members of a community.
async fn community_members(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CommunityIdRequest>,
) -> AppResult<ApiResponse<Vec<community_member::Model>>> {
    let members = state.community_service.members(&req.community_id).await?;
    Ok(ApiResponse::ok(members))
}

/// Ban, suspension, mute and block state of a user.
async fn moderation_status(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<UserIdRequest>,
) -> AppResult<ApiResponse<ModerationStatus>> {
    let status = state
        .moderation_service
        .status(&admin.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(status))
}

/// All suspensions of a user, newest first.
async fn suspension_history(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<UserIdRequest>,
) -> AppResult<ApiResponse<Vec<user_suspension::Model>>> {
    let history = state
        .moderation_service
        .suspension_history(&req.user_id)
        .await?;
    Ok(ApiResponse::ok(history))
}

/// Pending reports, newest first.
async fn moderation_queue(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<content_report::Model>>> {
    let queue = state.report_service.moderation_queue().await?;
    Ok(ApiResponse::ok(queue))
}

/// Download a tab as CSV.
async fn export(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(tab): Path<String>,
    uri: Uri,
) -> AppResult<CsvDownload> {
    let tab: Tab = tab.parse()?;
    let filter = tab_filter(tab, &uri)?;

    let mut snapshot = AdminSnapshot::default();
    snapshot.apply(state.loader.load_tab(tab).await?);

    let body = export_tab(&snapshot, &filter);
    info!(admin_id = %admin.id, tab = %tab, "Exported tab");

    Ok(CsvDownload {
        filename: export_filename(tab, Utc::now().date_naive()),
        body,
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", post(dashboard))
        .route("/dashboard/tab", post(dashboard_tab))
        .route("/actions/prepare", post(prepare))
        .route("/actions/confirm", post(confirm))
        .route("/actions/cancel", post(cancel))
        .route("/actions/pending", post(pending))
        .route("/actions/execute", post(execute))
        .route("/gym-requests/history", post(gym_request_history))
        .route("/communities/members", post(community_members))
        .route("/users/moderation-status", post(moderation_status))
        .route("/users/suspension-history", post(suspension_history))
        .route("/moderation-queue", post(moderation_queue))
        .route("/export/{tab}", get(export))
}
