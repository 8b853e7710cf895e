//! Typed admin commands.
//!
//! Every admin action is one [`AdminCommand`] variant carrying exactly the
//! payload it needs. Commands decode from `{"action": "...", ...}` JSON, so
//! an unknown action or a payload of the wrong shape is rejected before
//! anything runs.

use std::fmt;
use std::str::FromStr;

use gymhub_common::AppError;
use gymhub_db::entities::{community_member::MemberRole, feedback::FeedbackStatus};
use serde::{Deserialize, Serialize};

use crate::services::{FeedbackUpdate, GymPatch, GymRequestPatch, GymVisibility, Resolution};

/// Admin panel tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Users,
    Communities,
    Gyms,
    GymRequests,
    Reports,
    Posts,
    Comments,
    Feedback,
}

impl Tab {
    /// Every tab, in display order.
    pub const ALL: [Self; 8] = [
        Self::Users,
        Self::Communities,
        Self::Gyms,
        Self::GymRequests,
        Self::Reports,
        Self::Posts,
        Self::Comments,
        Self::Feedback,
    ];

    /// Wire name of the tab.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Communities => "communities",
            Self::Gyms => "gyms",
            Self::GymRequests => "gym_requests",
            Self::Reports => "reports",
            Self::Posts => "posts",
            Self::Comments => "comments",
            Self::Feedback => "feedback",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str() == normalized)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown tab: {s}")))
    }
}

/// Tone of a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptVariant {
    Danger,
    Warning,
    Info,
}

/// What the admin is asked before a command runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationPrompt {
    pub title: String,
    pub message: String,
    pub variant: PromptVariant,
    pub confirm_text: String,
}

impl ConfirmationPrompt {
    fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        variant: PromptVariant,
        confirm_text: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            variant,
            confirm_text: confirm_text.into(),
        }
    }
}

/// An admin action with its payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum AdminCommand {
    // Users
    BanUser {
        user_id: String,
    },
    UnbanUser {
        user_id: String,
    },
    SuspendUser {
        user_id: String,
        reason: String,
        #[serde(default)]
        notes: Option<String>,
        /// `None` suspends until lifted.
        #[serde(default)]
        duration_secs: Option<i64>,
    },
    UnsuspendUser {
        user_id: String,
    },
    DeleteUsers {
        user_ids: Vec<String>,
    },
    SetAdmin {
        user_id: String,
        is_admin: bool,
    },
    ExpireSuspensions,

    // Communities
    SuspendCommunity {
        community_id: String,
    },
    UnsuspendCommunity {
        community_id: String,
    },
    BulkSetCommunitiesActive {
        community_ids: Vec<String>,
        active: bool,
    },
    DeleteCommunities {
        community_ids: Vec<String>,
    },
    ChangeMemberRole {
        community_id: String,
        user_id: String,
        role: MemberRole,
    },
    RemoveMember {
        community_id: String,
        user_id: String,
    },

    // Gym requests
    ApproveGymRequest {
        request_id: String,
        #[serde(default)]
        visibility: GymVisibility,
        #[serde(default)]
        navigate: bool,
    },
    BulkApproveGymRequests {
        request_ids: Vec<String>,
        #[serde(default)]
        visibility: GymVisibility,
    },
    RejectGymRequest {
        request_id: String,
        #[serde(default)]
        notes: Option<String>,
    },
    BulkRejectGymRequests {
        request_ids: Vec<String>,
        #[serde(default)]
        notes: Option<String>,
    },
    RestoreGymRequest {
        request_id: String,
    },
    UpdateGymRequest {
        request_id: String,
        patch: GymRequestPatch,
    },
    DeleteGymRequests {
        request_ids: Vec<String>,
    },

    // Gyms
    SetGymHidden {
        gym_id: String,
        hidden: bool,
    },
    BulkSetGymsHidden {
        gym_ids: Vec<String>,
        hidden: bool,
    },
    UpdateGym {
        gym_id: String,
        patch: GymPatch,
    },
    DeleteGyms {
        gym_ids: Vec<String>,
    },

    // Reports and content
    ResolveReport {
        report_id: String,
        resolution: Resolution,
    },
    DeletePosts {
        post_ids: Vec<String>,
    },
    DeleteComments {
        comment_ids: Vec<String>,
    },

    // Feedback
    UpdateFeedback {
        feedback_id: String,
        update: FeedbackUpdate,
    },
    BulkUpdateFeedbackStatus {
        feedback_ids: Vec<String>,
        status: FeedbackStatus,
    },
    DeleteFeedback {
        feedback_ids: Vec<String>,
    },
}

impl AdminCommand {
    /// Wire name of the action.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BanUser { .. } => "ban_user",
            Self::UnbanUser { .. } => "unban_user",
            Self::SuspendUser { .. } => "suspend_user",
            Self::UnsuspendUser { .. } => "unsuspend_user",
            Self::DeleteUsers { .. } => "delete_users",
            Self::SetAdmin { .. } => "set_admin",
            Self::ExpireSuspensions => "expire_suspensions",
            Self::SuspendCommunity { .. } => "suspend_community",
            Self::UnsuspendCommunity { .. } => "unsuspend_community",
            Self::BulkSetCommunitiesActive { .. } => "bulk_set_communities_active",
            Self::DeleteCommunities { .. } => "delete_communities",
            Self::ChangeMemberRole { .. } => "change_member_role",
            Self::RemoveMember { .. } => "remove_member",
            Self::ApproveGymRequest { .. } => "approve_gym_request",
            Self::BulkApproveGymRequests { .. } => "bulk_approve_gym_requests",
            Self::RejectGymRequest { .. } => "reject_gym_request",
            Self::BulkRejectGymRequests { .. } => "bulk_reject_gym_requests",
            Self::RestoreGymRequest { .. } => "restore_gym_request",
            Self::UpdateGymRequest { .. } => "update_gym_request",
            Self::DeleteGymRequests { .. } => "delete_gym_requests",
            Self::SetGymHidden { .. } => "set_gym_hidden",
            Self::BulkSetGymsHidden { .. } => "bulk_set_gyms_hidden",
            Self::UpdateGym { .. } => "update_gym",
            Self::DeleteGyms { .. } => "delete_gyms",
            Self::ResolveReport { .. } => "resolve_report",
            Self::DeletePosts { .. } => "delete_posts",
            Self::DeleteComments { .. } => "delete_comments",
            Self::UpdateFeedback { .. } => "update_feedback",
            Self::BulkUpdateFeedbackStatus { .. } => "bulk_update_feedback_status",
            Self::DeleteFeedback { .. } => "delete_feedback",
        }
    }

    /// Tabs whose data is stale after this command runs.
    #[must_use]
    pub const fn affected_tabs(&self) -> &'static [Tab] {
        match self {
            Self::BanUser { .. }
            | Self::UnbanUser { .. }
            | Self::SuspendUser { .. }
            | Self::UnsuspendUser { .. }
            | Self::SetAdmin { .. }
            | Self::ExpireSuspensions => &[Tab::Users],
            // Deleted accounts take their content and reports with them.
            Self::DeleteUsers { .. } => &[
                Tab::Users,
                Tab::Communities,
                Tab::Posts,
                Tab::Comments,
                Tab::Reports,
            ],
            Self::SuspendCommunity { .. }
            | Self::UnsuspendCommunity { .. }
            | Self::BulkSetCommunitiesActive { .. }
            | Self::ChangeMemberRole { .. }
            | Self::RemoveMember { .. } => &[Tab::Communities],
            Self::DeleteCommunities { .. } => &[Tab::Communities, Tab::Posts, Tab::Reports],
            Self::ApproveGymRequest { .. } | Self::BulkApproveGymRequests { .. } => {
                &[Tab::GymRequests, Tab::Gyms]
            }
            Self::RejectGymRequest { .. }
            | Self::BulkRejectGymRequests { .. }
            | Self::RestoreGymRequest { .. }
            | Self::UpdateGymRequest { .. }
            | Self::DeleteGymRequests { .. } => &[Tab::GymRequests, Tab::Gyms],
            Self::SetGymHidden { .. }
            | Self::BulkSetGymsHidden { .. }
            | Self::UpdateGym { .. }
            | Self::DeleteGyms { .. } => &[Tab::Gyms],
            Self::ResolveReport { .. } => {
                &[Tab::Reports, Tab::Posts, Tab::Comments, Tab::Communities]
            }
            Self::DeletePosts { .. } => &[Tab::Posts, Tab::Comments, Tab::Reports],
            Self::DeleteComments { .. } => &[Tab::Comments, Tab::Reports],
            Self::UpdateFeedback { .. }
            | Self::BulkUpdateFeedbackStatus { .. }
            | Self::DeleteFeedback { .. } => &[Tab::Feedback],
        }
    }

    /// The confirmation the admin sees before the command runs.
    #[must_use]
    pub fn prompt(&self) -> ConfirmationPrompt {
        use PromptVariant::{Danger, Info, Warning};

        match self {
            Self::BanUser { .. } => ConfirmationPrompt::new(
                "Ban user",
                "This user will lose access to the platform until unbanned.",
                Danger,
                "Ban",
            ),
            Self::UnbanUser { .. } => ConfirmationPrompt::new(
                "Unban user",
                "This user will regain access to the platform.",
                Info,
                "Unban",
            ),
            Self::SuspendUser { duration_secs, .. } => ConfirmationPrompt::new(
                "Suspend user",
                match duration_secs {
                    Some(secs) => format!("This user will be suspended for {}.", describe_secs(*secs)),
                    None => "This user will be suspended until the suspension is lifted.".to_string(),
                },
                Warning,
                "Suspend",
            ),
            Self::UnsuspendUser { .. } => ConfirmationPrompt::new(
                "Lift suspension",
                "The active suspension on this user will be lifted.",
                Info,
                "Lift",
            ),
            Self::DeleteUsers { user_ids } => ConfirmationPrompt::new(
                "Delete users",
                format!(
                    "{} will be permanently deleted. This cannot be undone.",
                    count_noun(user_ids.len(), "user")
                ),
                Danger,
                "Delete",
            ),
            Self::SetAdmin { is_admin: true, .. } => ConfirmationPrompt::new(
                "Grant admin",
                "This user will get full access to the admin panel.",
                Warning,
                "Grant",
            ),
            Self::SetAdmin { is_admin: false, .. } => ConfirmationPrompt::new(
                "Revoke admin",
                "This user will lose access to the admin panel.",
                Warning,
                "Revoke",
            ),
            Self::ExpireSuspensions => ConfirmationPrompt::new(
                "Expire suspensions",
                "All suspensions past their end time will be deactivated.",
                Info,
                "Run",
            ),
            Self::SuspendCommunity { .. } => ConfirmationPrompt::new(
                "Suspend community",
                "Members will not be able to use this community while it is suspended.",
                Warning,
                "Suspend",
            ),
            Self::UnsuspendCommunity { .. } => ConfirmationPrompt::new(
                "Reactivate community",
                "This community will become active again.",
                Info,
                "Reactivate",
            ),
            Self::BulkSetCommunitiesActive {
                community_ids,
                active,
            } => ConfirmationPrompt::new(
                if *active {
                    "Reactivate communities"
                } else {
                    "Suspend communities"
                },
                format!(
                    "{} will be {}. Communities already in that state are left alone.",
                    count_noun(community_ids.len(), "community"),
                    if *active { "reactivated" } else { "suspended" }
                ),
                if *active { Info } else { Warning },
                if *active { "Reactivate" } else { "Suspend" },
            ),
            Self::DeleteCommunities { community_ids } => ConfirmationPrompt::new(
                "Delete communities",
                format!(
                    "{} and all of their posts will be permanently deleted.",
                    count_noun(community_ids.len(), "community")
                ),
                Danger,
                "Delete",
            ),
            Self::ChangeMemberRole { role, .. } => ConfirmationPrompt::new(
                "Change member role",
                format!("This member will become {}.", role.as_str()),
                Warning,
                "Change",
            ),
            Self::RemoveMember { .. } => ConfirmationPrompt::new(
                "Remove member",
                "This member will be removed from the community.",
                Danger,
                "Remove",
            ),
            Self::ApproveGymRequest { visibility, .. } => ConfirmationPrompt::new(
                "Approve gym request",
                match visibility {
                    GymVisibility::Shown => "A public gym will be created from this request.",
                    GymVisibility::Hidden => "A hidden gym will be created from this request.",
                },
                Info,
                "Approve",
            ),
            Self::BulkApproveGymRequests {
                request_ids,
                visibility,
            } => ConfirmationPrompt::new(
                "Approve gym requests",
                format!(
                    "{} will be approved and {} gyms created. Requests that are no longer pending are skipped.",
                    count_noun(request_ids.len(), "request"),
                    match visibility {
                        GymVisibility::Shown => "public",
                        GymVisibility::Hidden => "hidden",
                    }
                ),
                Info,
                "Approve",
            ),
            Self::RejectGymRequest { .. } => ConfirmationPrompt::new(
                "Reject gym request",
                "This request will be rejected. It can be restored later.",
                Warning,
                "Reject",
            ),
            Self::BulkRejectGymRequests { request_ids, .. } => ConfirmationPrompt::new(
                "Reject gym requests",
                format!(
                    "{} will be rejected. Requests that are no longer pending are skipped.",
                    count_noun(request_ids.len(), "request")
                ),
                Warning,
                "Reject",
            ),
            Self::RestoreGymRequest { .. } => ConfirmationPrompt::new(
                "Restore gym request",
                "This request will return to pending review.",
                Info,
                "Restore",
            ),
            Self::UpdateGymRequest { .. } => ConfirmationPrompt::new(
                "Save gym request",
                "Your edits to this pending request will be saved.",
                Info,
                "Save",
            ),
            Self::DeleteGymRequests { request_ids } => ConfirmationPrompt::new(
                "Delete gym requests",
                format!(
                    "{} and their history will be permanently deleted.",
                    count_noun(request_ids.len(), "request")
                ),
                Danger,
                "Delete",
            ),
            Self::SetGymHidden { hidden, .. } => ConfirmationPrompt::new(
                if *hidden { "Hide gym" } else { "Show gym" },
                if *hidden {
                    "This gym will no longer be listed publicly."
                } else {
                    "This gym will be listed publicly."
                },
                if *hidden { Warning } else { Info },
                if *hidden { "Hide" } else { "Show" },
            ),
            Self::BulkSetGymsHidden { gym_ids, hidden } => ConfirmationPrompt::new(
                if *hidden { "Hide gyms" } else { "Show gyms" },
                format!(
                    "{} will be {}. Gyms already in that state are left alone.",
                    count_noun(gym_ids.len(), "gym"),
                    if *hidden { "hidden" } else { "shown" }
                ),
                if *hidden { Warning } else { Info },
                if *hidden { "Hide" } else { "Show" },
            ),
            Self::UpdateGym { .. } => ConfirmationPrompt::new(
                "Save gym",
                "Your edits to this gym will be saved.",
                Info,
                "Save",
            ),
            Self::DeleteGyms { gym_ids } => ConfirmationPrompt::new(
                "Delete gyms",
                format!(
                    "{} will be permanently deleted.",
                    count_noun(gym_ids.len(), "gym")
                ),
                Danger,
                "Delete",
            ),
            Self::ResolveReport {
                resolution: Resolution::Dismiss,
                ..
            } => ConfirmationPrompt::new(
                "Dismiss report",
                "The report will be closed and the content left in place.",
                Info,
                "Dismiss",
            ),
            Self::ResolveReport {
                resolution: Resolution::TakeAction,
                ..
            } => ConfirmationPrompt::new(
                "Remove reported content",
                "The reported content will be deleted and every pending report on it closed.",
                Danger,
                "Remove",
            ),
            Self::DeletePosts { post_ids } => ConfirmationPrompt::new(
                "Delete posts",
                format!(
                    "{} will be permanently deleted.",
                    count_noun(post_ids.len(), "post")
                ),
                Danger,
                "Delete",
            ),
            Self::DeleteComments { comment_ids } => ConfirmationPrompt::new(
                "Delete comments",
                format!(
                    "{} will be permanently deleted.",
                    count_noun(comment_ids.len(), "comment")
                ),
                Danger,
                "Delete",
            ),
            Self::UpdateFeedback { .. } => ConfirmationPrompt::new(
                "Update feedback",
                "Your changes to this feedback will be saved.",
                Info,
                "Save",
            ),
            Self::BulkUpdateFeedbackStatus {
                feedback_ids,
                status,
            } => ConfirmationPrompt::new(
                "Update feedback status",
                format!(
                    "{} will be marked {}.",
                    count_noun(feedback_ids.len(), "feedback item"),
                    status.as_str().replace('_', " ")
                ),
                Info,
                "Update",
            ),
            Self::DeleteFeedback { feedback_ids } => ConfirmationPrompt::new(
                "Delete feedback",
                format!(
                    "{} will be permanently deleted.",
                    count_noun(feedback_ids.len(), "feedback item")
                ),
                Danger,
                "Delete",
            ),
        }
    }
}

fn count_noun(count: usize, noun: &str) -> String {
    match (count, noun) {
        (1, _) => format!("1 {noun}"),
        (n, "community") => format!("{n} communities"),
        (n, _) => format!("{n} {noun}s"),
    }
}

fn describe_secs(secs: i64) -> String {
    const DAY: i64 = 86_400;
    const HOUR: i64 = 3_600;

    if secs >= DAY && secs % DAY == 0 {
        count_noun(usize::try_from(secs / DAY).unwrap_or(usize::MAX), "day")
    } else if secs >= HOUR && secs % HOUR == 0 {
        count_noun(usize::try_from(secs / HOUR).unwrap_or(usize::MAX), "hour")
    } else {
        count_noun(usize::try_from(secs.max(0)).unwrap_or(usize::MAX), "second")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_tagged_command() {
        let cmd: AdminCommand = serde_json::from_value(json!({
            "action": "bulk_approve_gym_requests",
            "requestIds": ["r1", "r2"],
            "visibility": "hidden",
        }))
        .unwrap();

        match cmd {
            AdminCommand::BulkApproveGymRequests {
                request_ids,
                visibility,
            } => {
                assert_eq!(request_ids, vec!["r1", "r2"]);
                assert_eq!(visibility, GymVisibility::Hidden);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_action_rejected() {
        let result: Result<AdminCommand, _> =
            serde_json::from_value(json!({"action": "launch_rockets"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_payload_shape_rejected() {
        let result: Result<AdminCommand, _> =
            serde_json::from_value(json!({"action": "ban_user", "userIds": ["u1"]}));
        assert!(result.is_err());
    }

    #[test]
    fn test_unit_command_decodes() {
        let cmd: AdminCommand =
            serde_json::from_value(json!({"action": "expire_suspensions"})).unwrap();
        assert_eq!(cmd.name(), "expire_suspensions");
    }

    #[test]
    fn test_destructive_prompts_are_danger() {
        let delete = AdminCommand::DeleteGyms {
            gym_ids: vec!["g1".to_string(), "g2".to_string()],
        };
        let prompt = delete.prompt();
        assert_eq!(prompt.variant, PromptVariant::Danger);
        assert!(prompt.message.starts_with("2 gyms"));

        let restore = AdminCommand::RestoreGymRequest {
            request_id: "r1".to_string(),
        };
        assert_eq!(restore.prompt().variant, PromptVariant::Info);
    }

    #[test]
    fn test_suspend_prompt_mentions_duration() {
        let cmd = AdminCommand::SuspendUser {
            user_id: "u1".to_string(),
            reason: "spam".to_string(),
            notes: None,
            duration_secs: Some(7 * 86_400),
        };
        assert!(cmd.prompt().message.contains("7 days"));
    }

    #[test]
    fn test_approval_reloads_gyms_and_requests() {
        let cmd = AdminCommand::ApproveGymRequest {
            request_id: "r1".to_string(),
            visibility: GymVisibility::Shown,
            navigate: false,
        };
        assert_eq!(cmd.affected_tabs(), &[Tab::GymRequests, Tab::Gyms]);
    }

    #[test]
    fn test_tab_from_str() {
        assert_eq!("gym-requests".parse::<Tab>().unwrap(), Tab::GymRequests);
        assert_eq!("Users".parse::<Tab>().unwrap(), Tab::Users);
        assert!("nope".parse::<Tab>().is_err());
    }

    #[test]
    fn test_count_noun() {
        assert_eq!(count_noun(1, "community"), "1 community");
        assert_eq!(count_noun(3, "community"), "3 communities");
        assert_eq!(count_noun(0, "post"), "0 posts");
    }
}
