//! User suspension repository.

use std::sync::Arc;

use crate::entities::{UserSuspension, user_suspension};
use chrono::{DateTime, FixedOffset};
use gymhub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, sea_query::Expr,
};

/// Suspension repository for database operations.
///
/// Suspensions are append-only: lifting or expiring one flips
/// `is_active` and stamps `lifted_at`, the row itself is kept.
#[derive(Clone)]
pub struct SuspensionRepository {
    db: Arc<DatabaseConnection>,
}

impl SuspensionRepository {
    /// Create a new suspension repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new suspension record.
    pub async fn create(
        &self,
        model: user_suspension::ActiveModel,
    ) -> AppResult<user_suspension::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Current suspension of a user: the latest active row.
    pub async fn find_active_for_user(
        &self,
        user_id: &str,
    ) -> AppResult<Option<user_suspension::Model>> {
        UserSuspension::find()
            .filter(user_suspension::Column::UserId.eq(user_id))
            .filter(user_suspension::Column::IsActive.eq(true))
            .order_by_desc(user_suspension::Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// All active suspensions, newest first.
    pub async fn find_all_active(&self) -> AppResult<Vec<user_suspension::Model>> {
        UserSuspension::find()
            .filter(user_suspension::Column::IsActive.eq(true))
            .order_by_desc(user_suspension::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Full suspension history of a user, newest first.
    pub async fn find_history(&self, user_id: &str) -> AppResult<Vec<user_suspension::Model>> {
        UserSuspension::find()
            .filter(user_suspension::Column::UserId.eq(user_id))
            .order_by_desc(user_suspension::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Lift every active suspension of a user.
    pub async fn lift_for_user(
        &self,
        user_id: &str,
        lifted_by: &str,
        now: DateTime<FixedOffset>,
    ) -> AppResult<u64> {
        let result = UserSuspension::update_many()
            .col_expr(user_suspension::Column::IsActive, Expr::value(false))
            .col_expr(user_suspension::Column::LiftedAt, Expr::value(Some(now)))
            .col_expr(
                user_suspension::Column::LiftedBy,
                Expr::value(Some(lifted_by.to_string())),
            )
            .filter(user_suspension::Column::UserId.eq(user_id))
            .filter(user_suspension::Column::IsActive.eq(true))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(result.rows_affected)
    }

    /// Deactivate active suspensions whose expiry has passed.
    pub async fn expire_due(&self, now: DateTime<FixedOffset>) -> AppResult<u64> {
        let result = UserSuspension::update_many()
            .col_expr(user_suspension::Column::IsActive, Expr::value(false))
            .col_expr(user_suspension::Column::LiftedAt, Expr::value(Some(now)))
            .filter(
                Condition::all()
                    .add(user_suspension::Column::IsActive.eq(true))
                    .add(user_suspension::Column::ExpiresAt.is_not_null())
                    .add(user_suspension::Column::ExpiresAt.lte(now)),
            )
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
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_suspension(id: &str, user_id: &str) -> user_suspension::Model {
        user_suspension::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            reason: "spam".to_string(),
            notes: None,
            suspended_by: "admin1".to_string(),
            expires_at: None,
            is_active: true,
            created_at: Utc::now().into(),
            lifted_at: None,
            lifted_by: None,
        }
    }

    #[tokio::test]
    async fn test_find_active_for_user() {
        let suspension = create_test_suspension("s1", "user1");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[suspension.clone()]])
            .into_connection();

        let repo = SuspensionRepository::new(Arc::new(db));
        let result = repo.find_active_for_user("user1").await.unwrap();

        assert_eq!(result, Some(suspension));
    }

    #[tokio::test]
    async fn test_expire_due_returns_count() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection();

        let repo = SuspensionRepository::new(Arc::new(db));
        let count = repo.expire_due(Utc::now().fixed_offset()).await.unwrap();

        assert_eq!(count, 3);
    }
}
