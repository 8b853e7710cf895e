//! User mute repository.

use std::sync::Arc;

use crate::entities::{UserMute, user_mute};
use chrono::Utc;
use gymhub_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Mute repository for database operations.
#[derive(Clone)]
pub struct MuteRepository {
    db: Arc<DatabaseConnection>,
}

impl MuteRepository {
    /// Create a new mute repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a mute by muter and muted user.
    pub async fn find_by_pair(
        &self,
        muter_id: &str,
        muted_id: &str,
    ) -> AppResult<Option<user_mute::Model>> {
        UserMute::find()
            .filter(user_mute::Column::MuterId.eq(muter_id))
            .filter(user_mute::Column::MutedId.eq(muted_id))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Check if a user is muting another user. Expired mutes do not count.
    pub async fn is_muting(&self, muter_id: &str, muted_id: &str) -> AppResult<bool> {
        let now = Utc::now().fixed_offset();
        Ok(self
            .find_by_pair(muter_id, muted_id)
            .await?
            .is_some_and(|m| m.expires_at.is_none_or(|at| at > now)))
    }

    /// Create a new mute.
    pub async fn create(&self, model: user_mute::ActiveModel) -> AppResult<user_mute::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Delete a mute by pair.
    pub async fn delete_by_pair(&self, muter_id: &str, muted_id: &str) -> AppResult<u64> {
        let result = UserMute::delete_many()
            .filter(user_mute::Column::MuterId.eq(muter_id))
            .filter(user_mute::Column::MutedId.eq(muted_id))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_mute(expires_at: Option<chrono::DateTime<chrono::FixedOffset>>) -> user_mute::Model {
        user_mute::Model {
            id: "m1".to_string(),
            muter_id: "alice".to_string(),
            muted_id: "bob".to_string(),
            expires_at,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_is_muting_permanent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_mute(None)]])
            .into_connection();

        let repo = MuteRepository::new(Arc::new(db));
        assert!(repo.is_muting("alice", "bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_muting_ignores_expired() {
        let expired = (Utc::now() - Duration::hours(1)).fixed_offset();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_mute(Some(expired))]])
            .into_connection();

        let repo = MuteRepository::new(Arc::new(db));
        assert!(!repo.is_muting("alice", "bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_muting_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_mute::Model>::new()])
            .into_connection();

        let repo = MuteRepository::new(Arc::new(db));
        assert!(!repo.is_muting("alice", "bob").await.unwrap());
    }
}
