//! Profile repository.

use std::sync::Arc;

use crate::entities::{Profile, profile};
use chrono::Utc;
use gymhub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};

/// Profile repository for database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a profile by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<profile::Model>> {
        Profile::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Get a profile by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<profile::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User: {id}")))
    }

    /// Find a profile by its session token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<profile::Model>> {
        Profile::find()
            .filter(profile::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Find profiles by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<profile::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Profile::find()
            .filter(profile::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// List profiles, newest first.
    pub async fn list(&self, limit: Option<u64>) -> AppResult<Vec<profile::Model>> {
        Profile::find()
            .order_by_desc(profile::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Create a new profile.
    pub async fn create(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Set the platform-wide ban flag.
    pub async fn set_banned(&self, id: &str, banned: bool) -> AppResult<u64> {
        let result = Profile::update_many()
            .col_expr(profile::Column::IsBanned, Expr::value(banned))
            .filter(profile::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(result.rows_affected)
    }

    /// Grant or revoke admin rights.
    pub async fn set_admin(&self, id: &str, is_admin: bool) -> AppResult<u64> {
        let result = Profile::update_many()
            .col_expr(profile::Column::IsAdmin, Expr::value(is_admin))
            .filter(profile::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(result.rows_affected)
    }

    /// Record activity for a profile.
    pub async fn touch_last_active(&self, id: &str) -> AppResult<()> {
        Profile::update_many()
            .col_expr(
                profile::Column::LastActiveAt,
                Expr::value(Some(Utc::now().fixed_offset())),
            )
            .filter(profile::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(())
    }

    /// Delete profiles by IDs.
    pub async fn delete_many(&self, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Profile::delete_many()
            .filter(profile::Column::Id.is_in(ids.iter().cloned()))
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

    fn create_test_profile(id: &str, token: &str) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            full_name: "Alex Honnold".to_string(),
            email: format!("{id}@gymhub.test"),
            token: Some(token.to_string()),
            is_admin: false,
            is_banned: false,
            created_at: Utc::now().into(),
            last_active_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_token() {
        let profile = create_test_profile("user1", "tok1");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[profile.clone()]])
            .into_connection();

        let repo = ProfileRepository::new(Arc::new(db));
        let result = repo.find_by_token("tok1").await.unwrap();

        assert_eq!(result.unwrap().id, "user1");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<profile::Model>::new()])
            .into_connection();

        let repo = ProfileRepository::new(Arc::new(db));
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_banned_reports_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let repo = ProfileRepository::new(Arc::new(db));
        assert_eq!(repo.set_banned("user1", true).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_many_empty_skips_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = ProfileRepository::new(Arc::new(db));

        assert_eq!(repo.delete_many(&[]).await.unwrap(), 0);
    }
}
