//! User administration service.

use gymhub_common::{AppError, AppResult};
use gymhub_db::{entities::profile, repositories::ProfileRepository};
use tracing::info;

use super::dedup_ids;

/// Service for account deletion and admin rights.
#[derive(Clone)]
pub struct UserService {
    profile_repo: ProfileRepository,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(profile_repo: ProfileRepository) -> Self {
        Self { profile_repo }
    }

    /// List profiles, newest first.
    pub async fn list(&self, limit: Option<u64>) -> AppResult<Vec<profile::Model>> {
        self.profile_repo.list(limit).await
    }

    /// Delete user accounts. An admin cannot delete their own account.
    pub async fn delete_users(&self, admin_id: &str, ids: &[String]) -> AppResult<u64> {
        let ids = dedup_ids(ids);
        if ids.is_empty() {
            return Err(AppError::BadRequest("No users selected".to_string()));
        }
        if ids.iter().any(|id| id == admin_id) {
            return Err(AppError::BadRequest(
                "Cannot delete your own account".to_string(),
            ));
        }

        let deleted = self.profile_repo.delete_many(&ids).await?;
        info!(admin_id, requested = ids.len(), deleted, "Users deleted");
        Ok(deleted)
    }

    /// Grant or revoke admin rights. Admins cannot revoke their own.
    pub async fn set_admin(&self, admin_id: &str, user_id: &str, is_admin: bool) -> AppResult<()> {
        if admin_id == user_id && !is_admin {
            return Err(AppError::BadRequest(
                "Cannot revoke your own admin rights".to_string(),
            ));
        }

        self.profile_repo.get_by_id(user_id).await?;
        self.profile_repo.set_admin(user_id, is_admin).await?;

        info!(admin_id, user_id, is_admin, "Admin rights changed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_delete_self_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = UserService::new(ProfileRepository::new(db));

        let ids = vec!["u1".to_string(), "admin1".to_string()];
        let result = service.delete_users("admin1", &ids).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_users_dedups() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );
        let service = UserService::new(ProfileRepository::new(db));

        let ids = vec!["u1".to_string(), "u2".to_string(), "u1".to_string()];
        assert_eq!(service.delete_users("admin1", &ids).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_revoke_own_admin_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = UserService::new(ProfileRepository::new(db));

        let result = service.set_admin("admin1", "admin1", false).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
