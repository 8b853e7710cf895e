//! Moderation service: bans, suspensions, mutes and blocks.
//!
//! The four primitives are kept apart on purpose. A ban flips a flag on
//! the profile, a suspension is an audit row with an optional expiry, a
//! mute hides one user from another, and a block separates two users.
//! None of them reads or writes the others' state.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use gymhub_common::{AppError, AppResult, IdGenerator};
use gymhub_db::{
    entities::{user_block, user_mute, user_suspension},
    repositories::{BlockRepository, MuteRepository, ProfileRepository, SuspensionRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// Expiry `secs` after `now`. Out-of-range durations are a bad request.
fn expiry_after(now: DateTime<Utc>, secs: i64) -> AppResult<DateTime<FixedOffset>> {
    Duration::try_seconds(secs)
        .and_then(|duration| now.checked_add_signed(duration))
        .map(|at| at.fixed_offset())
        .ok_or_else(|| AppError::BadRequest(format!("Duration out of range: {secs}s")))
}

/// Input for suspending a user.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SuspendInput {
    pub user_id: String,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Duration in seconds, None for permanent.
    #[validate(range(min = 1, max = 315_360_000))]
    pub duration_secs: Option<i64>,
}

/// Input for muting a user.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MuteInput {
    pub user_id: String,
    /// Mute duration in seconds, None for permanent.
    #[validate(range(min = 1, max = 315_360_000))]
    pub expires_in_secs: Option<i64>,
}

/// Input for blocking a user.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BlockInput {
    pub user_id: String,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// The four moderation gates for one user, read side by side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationStatus {
    pub user_id: String,
    pub banned: bool,
    pub suspension: Option<user_suspension::Model>,
    /// Whether the viewer has muted this user.
    pub muted_by_viewer: bool,
    /// Whether either side has blocked the other.
    pub blocked: bool,
}

/// Moderation service.
#[derive(Clone)]
pub struct ModerationService {
    profile_repo: ProfileRepository,
    suspension_repo: SuspensionRepository,
    mute_repo: MuteRepository,
    block_repo: BlockRepository,
    id_gen: IdGenerator,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub const fn new(
        profile_repo: ProfileRepository,
        suspension_repo: SuspensionRepository,
        mute_repo: MuteRepository,
        block_repo: BlockRepository,
    ) -> Self {
        Self {
            profile_repo,
            suspension_repo,
            mute_repo,
            block_repo,
            id_gen: IdGenerator::new(),
        }
    }

    // ========== Ban ==========

    /// Ban a user platform-wide.
    pub async fn ban(&self, admin_id: &str, user_id: &str) -> AppResult<()> {
        if admin_id == user_id {
            return Err(AppError::BadRequest("Cannot ban yourself".to_string()));
        }

        self.profile_repo.get_by_id(user_id).await?;
        self.profile_repo.set_banned(user_id, true).await?;

        info!(admin_id, user_id, "User banned");
        Ok(())
    }

    /// Lift a ban.
    pub async fn unban(&self, admin_id: &str, user_id: &str) -> AppResult<()> {
        self.profile_repo.get_by_id(user_id).await?;
        self.profile_repo.set_banned(user_id, false).await?;

        info!(admin_id, user_id, "User unbanned");
        Ok(())
    }

    // ========== Suspensions ==========

    /// Suspend a user, permanently or for a duration.
    pub async fn suspend(
        &self,
        admin_id: &str,
        input: SuspendInput,
    ) -> AppResult<user_suspension::Model> {
        input.validate()?;

        if admin_id == input.user_id {
            return Err(AppError::BadRequest("Cannot suspend yourself".to_string()));
        }

        self.profile_repo.get_by_id(&input.user_id).await?;

        if self.current_suspension(&input.user_id).await?.is_some() {
            return Err(AppError::Conflict("User is already suspended".to_string()));
        }

        let now = Utc::now();
        let expires_at = input
            .duration_secs
            .map(|secs| expiry_after(now, secs))
            .transpose()?;

        let model = user_suspension::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(input.user_id.clone()),
            reason: Set(input.reason.trim().to_string()),
            notes: Set(input.notes),
            suspended_by: Set(admin_id.to_string()),
            expires_at: Set(expires_at),
            is_active: Set(true),
            created_at: Set(now.into()),
            lifted_at: Set(None),
            lifted_by: Set(None),
        };

        let suspension = self.suspension_repo.create(model).await?;
        info!(admin_id, user_id = %input.user_id, permanent = expires_at.is_none(), "User suspended");
        Ok(suspension)
    }

    /// Lift a user's active suspension.
    pub async fn unsuspend(&self, admin_id: &str, user_id: &str) -> AppResult<u64> {
        let lifted = self
            .suspension_repo
            .lift_for_user(user_id, admin_id, Utc::now().fixed_offset())
            .await?;

        if lifted == 0 {
            return Err(AppError::NotFound(format!(
                "No active suspension for user: {user_id}"
            )));
        }

        info!(admin_id, user_id, "User unsuspended");
        Ok(lifted)
    }

    /// Current suspension of a user, if any. Rows past their expiry that
    /// the sweeper has not reached yet do not count.
    pub async fn current_suspension(
        &self,
        user_id: &str,
    ) -> AppResult<Option<user_suspension::Model>> {
        let now = Utc::now().fixed_offset();
        Ok(self
            .suspension_repo
            .find_active_for_user(user_id)
            .await?
            .filter(|s| s.expires_at.is_none_or(|at| at > now)))
    }

    /// All suspension records of a user, newest first.
    pub async fn suspension_history(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<user_suspension::Model>> {
        self.suspension_repo.find_history(user_id).await
    }

    /// Deactivate suspensions whose expiry has passed.
    pub async fn expire_suspensions(&self) -> AppResult<u64> {
        let expired = self
            .suspension_repo
            .expire_due(Utc::now().fixed_offset())
            .await?;

        if expired > 0 {
            info!(count = expired, "Expired suspensions");
        }
        Ok(expired)
    }

    // ========== Mutes ==========

    /// Mute a user.
    pub async fn mute(&self, muter_id: &str, input: MuteInput) -> AppResult<user_mute::Model> {
        input.validate()?;

        if muter_id == input.user_id {
            return Err(AppError::BadRequest("Cannot mute yourself".to_string()));
        }

        self.profile_repo.get_by_id(&input.user_id).await?;

        let now = Utc::now();
        if let Some(existing) = self.mute_repo.find_by_pair(muter_id, &input.user_id).await? {
            if existing.expires_at.is_none_or(|at| at > now) {
                return Err(AppError::Conflict("Already muted".to_string()));
            }
            // Lapsed mute, replace it
            self.mute_repo
                .delete_by_pair(muter_id, &input.user_id)
                .await?;
        }

        let expires_at = input
            .expires_in_secs
            .map(|secs| expiry_after(now, secs))
            .transpose()?;

        let model = user_mute::ActiveModel {
            id: Set(self.id_gen.generate()),
            muter_id: Set(muter_id.to_string()),
            muted_id: Set(input.user_id),
            expires_at: Set(expires_at),
            created_at: Set(now.into()),
        };

        self.mute_repo.create(model).await
    }

    /// Unmute a user.
    pub async fn unmute(&self, muter_id: &str, muted_id: &str) -> AppResult<()> {
        if self.mute_repo.delete_by_pair(muter_id, muted_id).await? == 0 {
            return Err(AppError::NotFound("Not muted".to_string()));
        }
        Ok(())
    }

    /// Whether `muter_id` currently mutes `muted_id`.
    pub async fn is_muting(&self, muter_id: &str, muted_id: &str) -> AppResult<bool> {
        self.mute_repo.is_muting(muter_id, muted_id).await
    }

    // ========== Blocks ==========

    /// Block a user.
    pub async fn block(
        &self,
        blocker_id: &str,
        input: BlockInput,
    ) -> AppResult<user_block::Model> {
        input.validate()?;

        if blocker_id == input.user_id {
            return Err(AppError::BadRequest("Cannot block yourself".to_string()));
        }

        self.profile_repo.get_by_id(&input.user_id).await?;

        if self.block_repo.is_blocking(blocker_id, &input.user_id).await? {
            return Err(AppError::Conflict("Already blocked".to_string()));
        }

        let model = user_block::ActiveModel {
            id: Set(self.id_gen.generate()),
            blocker_id: Set(blocker_id.to_string()),
            blocked_id: Set(input.user_id),
            reason: Set(input.reason),
            created_at: Set(Utc::now().into()),
        };

        self.block_repo.create(model).await
    }

    /// Unblock a user.
    pub async fn unblock(&self, blocker_id: &str, blocked_id: &str) -> AppResult<()> {
        if self.block_repo.delete_by_pair(blocker_id, blocked_id).await? == 0 {
            return Err(AppError::NotFound("Not blocked".to_string()));
        }
        Ok(())
    }

    /// Whether `blocker_id` blocks `blocked_id`.
    pub async fn is_blocked(&self, blocker_id: &str, blocked_id: &str) -> AppResult<bool> {
        self.block_repo.is_blocking(blocker_id, blocked_id).await
    }

    /// Whether either user blocks the other.
    pub async fn is_blocked_either_way(&self, user_a: &str, user_b: &str) -> AppResult<bool> {
        self.block_repo.is_blocked_either_way(user_a, user_b).await
    }

    // ========== Combined read ==========

    /// Read all four gates for `user_id` as seen by `viewer_id`.
    pub async fn status(&self, viewer_id: &str, user_id: &str) -> AppResult<ModerationStatus> {
        let profile = self.profile_repo.get_by_id(user_id).await?;

        Ok(ModerationStatus {
            user_id: profile.id,
            banned: profile.is_banned,
            suspension: self.current_suspension(user_id).await?,
            muted_by_viewer: self.is_muting(viewer_id, user_id).await?,
            blocked: self.is_blocked_either_way(viewer_id, user_id).await?,
        })
    }
}
