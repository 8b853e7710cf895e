//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use gymhub_common::{AdminConfig, AppError};
use gymhub_core::{
    AdminDataLoader, CommandDispatcher, CommunityService, ConfirmationGate, ConversationService,
    GymRequestService, ModerationService, ReportService, SessionService,
};
use gymhub_db::repositories::{
    BlockRepository, CommunityRepository, ContentRepository, ConversationRepository,
    GymRequestRepository, MuteRepository, ProfileRepository, ReportRepository,
    SuspensionRepository,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub session_service: SessionService,
    pub moderation_service: ModerationService,
    pub conversation_service: ConversationService,
    pub report_service: ReportService,
    pub community_service: CommunityService,
    pub gym_request_service: GymRequestService,
    pub loader: AdminDataLoader,
    pub confirmations: ConfirmationGate,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(db: &Arc<DatabaseConnection>, admin: &AdminConfig) -> Self {
        let profile_repo = ProfileRepository::new(Arc::clone(db));
        let block_repo = BlockRepository::new(Arc::clone(db));
        let community_repo = CommunityRepository::new(Arc::clone(db));
        let dispatcher = CommandDispatcher::from_db(db);

        Self {
            session_service: SessionService::new(profile_repo.clone()),
            moderation_service: ModerationService::new(
                profile_repo,
                SuspensionRepository::new(Arc::clone(db)),
                MuteRepository::new(Arc::clone(db)),
                block_repo.clone(),
            ),
            conversation_service: ConversationService::new(
                ConversationRepository::new(Arc::clone(db)),
                block_repo,
            ),
            report_service: ReportService::new(
                ReportRepository::new(Arc::clone(db)),
                ContentRepository::new(Arc::clone(db)),
                community_repo.clone(),
            ),
            community_service: CommunityService::new(community_repo),
            gym_request_service: GymRequestService::new(GymRequestRepository::new(Arc::clone(db))),
            loader: AdminDataLoader::from_db(db, admin.list_limit),
            confirmations: ConfirmationGate::new(dispatcher, admin.confirmation_ttl_secs),
        }
    }
}

/// Authentication middleware.
///
/// A valid token puts the profile into request extensions. A missing or
/// unknown token passes through and the extractors reject the request;
/// a banned account or a store failure is answered here.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    if let Some(token) = token {
        match state.session_service.authenticate(&token).await {
            Ok(profile) => {
                req.extensions_mut().insert(profile);
            }
            Err(AppError::Unauthorized) => {}
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}
