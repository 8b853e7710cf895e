//! Session gate: resolves bearer tokens and checks admin rights.

use gymhub_common::{AppError, AppResult};
use gymhub_db::{entities::profile, repositories::ProfileRepository};
use tracing::warn;

/// Resolves session tokens to profiles.
#[derive(Clone)]
pub struct SessionService {
    profile_repo: ProfileRepository,
}

impl SessionService {
    /// Create a new session service.
    #[must_use]
    pub const fn new(profile_repo: ProfileRepository) -> Self {
        Self { profile_repo }
    }

    /// Resolve a bearer token to its profile.
    ///
    /// Banned accounts are refused here: the ban flag governs platform
    /// access and nothing else.
    pub async fn authenticate(&self, token: &str) -> AppResult<profile::Model> {
        let profile = self
            .profile_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if profile.is_banned {
            return Err(AppError::Forbidden("Account is banned".to_string()));
        }

        if let Err(e) = self.profile_repo.touch_last_active(&profile.id).await {
            warn!(error = %e, user_id = %profile.id, "Failed to record activity");
        }

        Ok(profile)
    }
}

/// Require admin rights.
pub fn require_admin(profile: &profile::Model) -> AppResult<()> {
    if profile.is_banned {
        return Err(AppError::Forbidden("Account is banned".to_string()));
    }
    if !profile.is_admin {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(())
}
