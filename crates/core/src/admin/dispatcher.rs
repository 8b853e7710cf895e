//! Routes admin commands to the services that carry them out.

use std::sync::Arc;

use gymhub_common::AppResult;
use gymhub_db::repositories::{
    BlockRepository, CommunityRepository, ContentRepository, FeedbackRepository, GymRepository,
    GymRequestRepository, MuteRepository, ProfileRepository, ReportRepository,
    SuspensionRepository,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::info;

use super::command::{AdminCommand, Tab};
use crate::services::{
    BulkOutcome, CommunityService, FeedbackService, GymRequestService, GymService,
    ModerationService, ReportService, SuspendInput, UserService,
};

/// What a dispatched command did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
    pub action: &'static str,
    pub summary: String,
    pub applied: u64,
    pub skipped: u64,
    /// Entity the client should open next, if any.
    pub navigate_to: Option<String>,
    /// Tabs to reload.
    pub affected: Vec<Tab>,
}

impl CommandOutcome {
    fn single(command: &AdminCommand, summary: impl Into<String>) -> Self {
        Self::counted(command, summary, 1, 0)
    }

    fn bulk(command: &AdminCommand, summary: impl Into<String>, outcome: BulkOutcome) -> Self {
        Self::counted(command, summary, outcome.applied, outcome.skipped)
    }

    fn counted(
        command: &AdminCommand,
        summary: impl Into<String>,
        applied: u64,
        skipped: u64,
    ) -> Self {
        Self {
            action: command.name(),
            summary: summary.into(),
            applied,
            skipped,
            navigate_to: None,
            affected: command.affected_tabs().to_vec(),
        }
    }
}

/// Executes [`AdminCommand`]s.
#[derive(Clone)]
pub struct CommandDispatcher {
    moderation: ModerationService,
    users: UserService,
    communities: CommunityService,
    gyms: GymService,
    gym_requests: GymRequestService,
    reports: ReportService,
    feedback: FeedbackService,
}

impl CommandDispatcher {
    /// Build a dispatcher with services over one connection pool.
    #[must_use]
    pub fn from_db(db: &Arc<DatabaseConnection>) -> Self {
        let profile_repo = ProfileRepository::new(Arc::clone(db));
        let community_repo = CommunityRepository::new(Arc::clone(db));

        Self {
            moderation: ModerationService::new(
                profile_repo.clone(),
                SuspensionRepository::new(Arc::clone(db)),
                MuteRepository::new(Arc::clone(db)),
                BlockRepository::new(Arc::clone(db)),
            ),
            users: UserService::new(profile_repo),
            communities: CommunityService::new(community_repo.clone()),
            gyms: GymService::new(GymRepository::new(Arc::clone(db))),
            gym_requests: GymRequestService::new(GymRequestRepository::new(Arc::clone(db))),
            reports: ReportService::new(
                ReportRepository::new(Arc::clone(db)),
                ContentRepository::new(Arc::clone(db)),
                community_repo,
            ),
            feedback: FeedbackService::new(FeedbackRepository::new(Arc::clone(db))),
        }
    }

    /// Moderation service used by the dispatcher.
    #[must_use]
    pub const fn moderation(&self) -> &ModerationService {
        &self.moderation
    }

    /// Run a command on behalf of `admin_id`.
    pub async fn dispatch(&self, admin_id: &str, command: AdminCommand) -> AppResult<CommandOutcome> {
        let outcome = self.route(admin_id, &command).await?;
        info!(
            admin_id,
            action = outcome.action,
            applied = outcome.applied,
            skipped = outcome.skipped,
            "Admin command completed"
        );
        Ok(outcome)
    }

    async fn route(&self, admin_id: &str, command: &AdminCommand) -> AppResult<CommandOutcome> {
        let outcome = match command {
            // ========== Users ==========
            AdminCommand::BanUser { user_id } => {
                self.moderation.ban(admin_id, user_id).await?;
                CommandOutcome::single(command, "User banned")
            }
            AdminCommand::UnbanUser { user_id } => {
                self.moderation.unban(admin_id, user_id).await?;
                CommandOutcome::single(command, "User unbanned")
            }
            AdminCommand::SuspendUser {
                user_id,
                reason,
                notes,
                duration_secs,
            } => {
                self.moderation
                    .suspend(
                        admin_id,
                        SuspendInput {
                            user_id: user_id.clone(),
                            reason: reason.clone(),
                            notes: notes.clone(),
                            duration_secs: *duration_secs,
                        },
                    )
                    .await?;
                CommandOutcome::single(command, "User suspended")
            }
            AdminCommand::UnsuspendUser { user_id } => {
                let lifted = self.moderation.unsuspend(admin_id, user_id).await?;
                CommandOutcome::counted(command, "Suspension lifted", lifted, 0)
            }
            AdminCommand::DeleteUsers { user_ids } => {
                let deleted = self.users.delete_users(admin_id, user_ids).await?;
                deleted_outcome(command, deleted, user_ids.len(), "user")
            }
            AdminCommand::SetAdmin { user_id, is_admin } => {
                self.users.set_admin(admin_id, user_id, *is_admin).await?;
                CommandOutcome::single(
                    command,
                    if *is_admin {
                        "Admin rights granted"
                    } else {
                        "Admin rights revoked"
                    },
                )
            }
            AdminCommand::ExpireSuspensions => {
                let expired = self.moderation.expire_suspensions().await?;
                CommandOutcome::counted(command, format!("{expired} suspensions expired"), expired, 0)
            }

            // ========== Communities ==========
            AdminCommand::SuspendCommunity { community_id } => {
                let changed = self
                    .communities
                    .set_active(admin_id, community_id, false)
                    .await?;
                toggled_outcome(command, changed, "Community suspended", "Community already suspended")
            }
            AdminCommand::UnsuspendCommunity { community_id } => {
                let changed = self
                    .communities
                    .set_active(admin_id, community_id, true)
                    .await?;
                toggled_outcome(command, changed, "Community reactivated", "Community already active")
            }
            AdminCommand::BulkSetCommunitiesActive {
                community_ids,
                active,
            } => {
                let outcome = self
                    .communities
                    .bulk_set_active(admin_id, community_ids, *active)
                    .await?;
                let verb = if *active { "reactivated" } else { "suspended" };
                CommandOutcome::bulk(
                    command,
                    bulk_summary(outcome, "communities", verb),
                    outcome,
                )
            }
            AdminCommand::DeleteCommunities { community_ids } => {
                let deleted = self.communities.delete(admin_id, community_ids).await?;
                deleted_outcome(command, deleted, community_ids.len(), "community")
            }
            AdminCommand::ChangeMemberRole {
                community_id,
                user_id,
                role,
            } => {
                let member = self
                    .communities
                    .change_member_role(admin_id, community_id, user_id, *role)
                    .await?;
                CommandOutcome::single(command, format!("Member is now {}", member.role.as_str()))
            }
            AdminCommand::RemoveMember {
                community_id,
                user_id,
            } => {
                self.communities
                    .remove_member(admin_id, community_id, user_id)
                    .await?;
                CommandOutcome::single(command, "Member removed")
            }

            // ========== Gym requests ==========
            AdminCommand::ApproveGymRequest {
                request_id,
                visibility,
                navigate,
            } => {
                let approval = self
                    .gym_requests
                    .approve(admin_id, request_id, *visibility, *navigate)
                    .await?;
                let mut outcome =
                    CommandOutcome::single(command, format!("Approved {}", approval.gym.name));
                outcome.navigate_to = approval.navigate_to;
                outcome
            }
            AdminCommand::BulkApproveGymRequests {
                request_ids,
                visibility,
            } => {
                let outcome = self
                    .gym_requests
                    .bulk_approve(admin_id, request_ids, *visibility)
                    .await?;
                CommandOutcome::bulk(command, bulk_summary(outcome, "requests", "approved"), outcome)
            }
            AdminCommand::RejectGymRequest { request_id, notes } => {
                self.gym_requests
                    .reject(admin_id, request_id, notes.clone())
                    .await?;
                CommandOutcome::single(command, "Request rejected")
            }
            AdminCommand::BulkRejectGymRequests { request_ids, notes } => {
                let outcome = self
                    .gym_requests
                    .bulk_reject(admin_id, request_ids, notes.clone())
                    .await?;
                CommandOutcome::bulk(command, bulk_summary(outcome, "requests", "rejected"), outcome)
            }
            AdminCommand::RestoreGymRequest { request_id } => {
                self.gym_requests.restore(admin_id, request_id).await?;
                CommandOutcome::single(command, "Request restored to pending")
            }
            AdminCommand::UpdateGymRequest { request_id, patch } => {
                self.gym_requests
                    .update(admin_id, request_id, patch.clone())
                    .await?;
                CommandOutcome::single(command, "Request saved")
            }
            AdminCommand::DeleteGymRequests { request_ids } => {
                let deleted = self.gym_requests.delete(admin_id, request_ids).await?;
                deleted_outcome(command, deleted, request_ids.len(), "request")
            }

            // ========== Gyms ==========
            AdminCommand::SetGymHidden { gym_id, hidden } => {
                let changed = self.gyms.set_hidden(admin_id, gym_id, *hidden).await?;
                if *hidden {
                    toggled_outcome(command, changed, "Gym hidden", "Gym already hidden")
                } else {
                    toggled_outcome(command, changed, "Gym shown", "Gym already shown")
                }
            }
            AdminCommand::BulkSetGymsHidden { gym_ids, hidden } => {
                let outcome = self.gyms.bulk_set_hidden(admin_id, gym_ids, *hidden).await?;
                let verb = if *hidden { "hidden" } else { "shown" };
                CommandOutcome::bulk(command, bulk_summary(outcome, "gyms", verb), outcome)
            }
            AdminCommand::UpdateGym { gym_id, patch } => {
                self.gyms.update(admin_id, gym_id, patch.clone()).await?;
                CommandOutcome::single(command, "Gym saved")
            }
            AdminCommand::DeleteGyms { gym_ids } => {
                let deleted = self.gyms.delete(admin_id, gym_ids).await?;
                deleted_outcome(command, deleted, gym_ids.len(), "gym")
            }

            // ========== Reports and content ==========
            AdminCommand::ResolveReport {
                report_id,
                resolution,
            } => {
                let resolved = self
                    .reports
                    .resolve(admin_id, report_id, *resolution)
                    .await?;
                let summary = if resolved.subject_deleted {
                    format!(
                        "Content removed, {} reports closed",
                        resolved.reports_closed
                    )
                } else {
                    "Report dismissed".to_string()
                };
                CommandOutcome::counted(command, summary, resolved.reports_closed, 0)
            }
            AdminCommand::DeletePosts { post_ids } => {
                let deleted = self.reports.delete_posts(admin_id, post_ids).await?;
                deleted_outcome(command, deleted, post_ids.len(), "post")
            }
            AdminCommand::DeleteComments { comment_ids } => {
                let deleted = self.reports.delete_comments(admin_id, comment_ids).await?;
                deleted_outcome(command, deleted, comment_ids.len(), "comment")
            }

            // ========== Feedback ==========
            AdminCommand::UpdateFeedback {
                feedback_id,
                update,
            } => {
                self.feedback
                    .update(admin_id, feedback_id, update.clone())
                    .await?;
                CommandOutcome::single(command, "Feedback updated")
            }
            AdminCommand::BulkUpdateFeedbackStatus {
                feedback_ids,
                status,
            } => {
                let outcome = self
                    .feedback
                    .bulk_update_status(admin_id, feedback_ids, *status)
                    .await?;
                CommandOutcome::bulk(
                    command,
                    bulk_summary(outcome, "feedback items", &format!("marked {}", status.as_str())),
                    outcome,
                )
            }
            AdminCommand::DeleteFeedback { feedback_ids } => {
                let deleted = self.feedback.delete(admin_id, feedback_ids).await?;
                deleted_outcome(command, deleted, feedback_ids.len(), "feedback item")
            }
        };

        Ok(outcome)
    }
}

fn toggled_outcome(
    command: &AdminCommand,
    changed: bool,
    done: &str,
    unchanged: &str,
) -> CommandOutcome {
    if changed {
        CommandOutcome::counted(command, done, 1, 0)
    } else {
        CommandOutcome::counted(command, unchanged, 0, 1)
    }
}

fn deleted_outcome(
    command: &AdminCommand,
    deleted: u64,
    requested: usize,
    noun: &str,
) -> CommandOutcome {
    let outcome = BulkOutcome::new(requested, deleted);
    let summary = if deleted == 1 {
        format!("1 {noun} deleted")
    } else if noun == "community" {
        format!("{deleted} communities deleted")
    } else {
        format!("{deleted} {noun}s deleted")
    };
    CommandOutcome::bulk(command, summary, outcome)
}

fn bulk_summary(outcome: BulkOutcome, noun: &str, verb: &str) -> String {
    if outcome.applied == 0 {
        return format!("No {noun} needed changes");
    }
    if outcome.skipped == 0 {
        format!("{} {noun} {verb}", outcome.applied)
    } else {
        format!(
            "{} {noun} {verb}, {} skipped",
            outcome.applied, outcome.skipped
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gymhub_common::AppError;
    use gymhub_db::entities::{community, gym, profile};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn create_test_profile(id: &str) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            full_name: "Test User".to_string(),
            email: format!("{id}@example.com"),
            token: None,
            is_admin: false,
            is_banned: false,
            created_at: Utc::now().into(),
            last_active_at: None,
        }
    }

    fn create_test_gym(id: &str, is_hidden: bool) -> gym::Model {
        gym::Model {
            id: id.to_string(),
            name: format!("Gym {id}"),
            country: "US".to_string(),
            city: "Austin".to_string(),
            address: None,
            description: None,
            website: None,
            is_hidden,
            facilities: serde_json::json!([]),
            difficulty_levels: serde_json::json!([]),
            opening_hours: serde_json::json!({}),
            created_by: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_ban_dispatch() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_profile("u1")]])
            .append_exec_results([exec(1)])
            .into_connection();
        let dispatcher = CommandDispatcher::from_db(&Arc::new(db));

        let outcome = dispatcher
            .dispatch(
                "admin1",
                AdminCommand::BanUser {
                    user_id: "u1".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.action, "ban_user");
        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.affected, vec![Tab::Users]);
    }

    #[tokio::test]
    async fn test_bulk_hide_reports_partial_outcome() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_gym("g1", true), create_test_gym("g2", false)]])
            .append_exec_results([exec(1)])
            .into_connection();
        let dispatcher = CommandDispatcher::from_db(&Arc::new(db));

        let outcome = dispatcher
            .dispatch(
                "admin1",
                AdminCommand::BulkSetGymsHidden {
                    gym_ids: vec!["g1".to_string(), "g2".to_string()],
                    hidden: true,
                },
            )
            .await
            .unwrap();

        assert_eq!((outcome.applied, outcome.skipped), (1, 1));
        assert_eq!(outcome.summary, "1 gyms hidden, 1 skipped");
    }

    #[tokio::test]
    async fn test_suspend_community_already_suspended_is_noop() {
        let suspended = community::Model {
            id: "c1".to_string(),
            name: "Boulderers".to_string(),
            description: None,
            rules: None,
            is_private: false,
            is_active: false,
            gym_id: None,
            community_type: "general".to_string(),
            created_by: "u1".to_string(),
            created_at: Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[suspended]])
            .into_connection();
        let dispatcher = CommandDispatcher::from_db(&Arc::new(db));

        let outcome = dispatcher
            .dispatch(
                "admin1",
                AdminCommand::SuspendCommunity {
                    community_id: "c1".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!((outcome.applied, outcome.skipped), (0, 1));
    }

    #[tokio::test]
    async fn test_service_error_propagates() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let dispatcher = CommandDispatcher::from_db(&Arc::new(db));

        let result = dispatcher
            .dispatch(
                "admin1",
                AdminCommand::DeleteUsers {
                    user_ids: vec!["admin1".to_string()],
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_bulk_summary_when_nothing_applied() {
        let summary = bulk_summary(BulkOutcome::new(3, 0), "gyms", "hidden");
        assert_eq!(summary, "No gyms needed changes");
    }
}
