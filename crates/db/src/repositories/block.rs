//! User block repository.

use std::sync::Arc;

use crate::entities::{UserBlock, user_block};
use gymhub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
};

/// Block repository for database operations.
#[derive(Clone)]
pub struct BlockRepository {
    db: Arc<DatabaseConnection>,
}

impl BlockRepository {
    /// Create a new block repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a block by blocker and blocked user.
    pub async fn find_by_pair(
        &self,
        blocker_id: &str,
        blocked_id: &str,
    ) -> AppResult<Option<user_block::Model>> {
        UserBlock::find()
            .filter(user_block::Column::BlockerId.eq(blocker_id))
            .filter(user_block::Column::BlockedId.eq(blocked_id))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Check if a user is blocking another user.
    pub async fn is_blocking(&self, blocker_id: &str, blocked_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(blocker_id, blocked_id).await?.is_some())
    }

    /// Check if either user is blocking the other.
    pub async fn is_blocked_either_way(&self, user_a: &str, user_b: &str) -> AppResult<bool> {
        let found = UserBlock::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(user_block::Column::BlockerId.eq(user_a))
                            .add(user_block::Column::BlockedId.eq(user_b)),
                    )
                    .add(
                        Condition::all()
                            .add(user_block::Column::BlockerId.eq(user_b))
                            .add(user_block::Column::BlockedId.eq(user_a)),
                    ),
            )
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(found.is_some())
    }

    /// Create a new block.
    pub async fn create(&self, model: user_block::ActiveModel) -> AppResult<user_block::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Delete a block by pair.
    pub async fn delete_by_pair(&self, blocker_id: &str, blocked_id: &str) -> AppResult<u64> {
        let result = UserBlock::delete_many()
            .filter(user_block::Column::BlockerId.eq(blocker_id))
            .filter(user_block::Column::BlockedId.eq(blocked_id))
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
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_is_blocked_either_way() {
        let block = user_block::Model {
            id: "b1".to_string(),
            blocker_id: "bob".to_string(),
            blocked_id: "alice".to_string(),
            reason: None,
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[block]])
            .into_connection();

        let repo = BlockRepository::new(Arc::new(db));
        assert!(repo.is_blocked_either_way("alice", "bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_blocking_false() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_block::Model>::new()])
            .into_connection();

        let repo = BlockRepository::new(Arc::new(db));
        assert!(!repo.is_blocking("alice", "bob").await.unwrap());
    }
}
