//! Gym repository.

use std::sync::Arc;

use crate::entities::{Gym, gym};
use gymhub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, sea_query::Expr,
};

/// Gym repository for database operations.
#[derive(Clone)]
pub struct GymRepository {
    db: Arc<DatabaseConnection>,
}

impl GymRepository {
    /// Create a new gym repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a gym by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<gym::Model>> {
        Gym::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Get a gym by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<gym::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Gym: {id}")))
    }

    /// Find gyms by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<gym::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Gym::find()
            .filter(gym::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// List all gyms, hidden ones included, by name.
    pub async fn list(&self) -> AppResult<Vec<gym::Model>> {
        Gym::find()
            .order_by_asc(gym::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Update a gym.
    pub async fn update(&self, model: gym::ActiveModel) -> AppResult<gym::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Set the hidden flag on the given gyms.
    pub async fn set_hidden_many(&self, ids: &[String], hidden: bool) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Gym::update_many()
            .col_expr(gym::Column::IsHidden, Expr::value(hidden))
            .filter(gym::Column::Id.is_in(ids.iter().cloned()))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(result.rows_affected)
    }

    /// Delete gyms by IDs.
    pub async fn delete_many(&self, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Gym::delete_many()
            .filter(gym::Column::Id.is_in(ids.iter().cloned()))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(result.rows_affected)
    }

    // ==================== Transactional ====================

    /// Insert one gym inside a transaction.
    pub async fn insert_in(
        txn: &DatabaseTransaction,
        model: gym::ActiveModel,
    ) -> AppResult<gym::Model> {
        model.insert(txn).await.map_err(AppError::from_db)
    }

    /// Insert several gyms inside a transaction with one statement.
    pub async fn insert_many_in(
        txn: &DatabaseTransaction,
        models: Vec<gym::ActiveModel>,
    ) -> AppResult<()> {
        if models.is_empty() {
            return Ok(());
        }

        Gym::insert_many(models)
            .exec_without_returning(txn)
            .await
            .map_err(AppError::from_db)?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    fn create_test_gym(id: &str, hidden: bool) -> gym::Model {
        gym::Model {
            id: id.to_string(),
            name: "Boulder Barn".to_string(),
            country: "USA".to_string(),
            city: "Austin".to_string(),
            address: None,
            description: None,
            website: None,
            is_hidden: hidden,
            facilities: json!(["bouldering"]),
            difficulty_levels: json!([]),
            opening_hours: json!({}),
            created_by: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let gym = create_test_gym("g1", true);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[gym.clone()]])
            .into_connection();

        let repo = GymRepository::new(Arc::new(db));
        let found = repo.get_by_id("g1").await.unwrap();

        assert!(found.is_hidden);
        assert_eq!(found.name, "Boulder Barn");
    }

    #[tokio::test]
    async fn test_set_hidden_many() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();

        let repo = GymRepository::new(Arc::new(db));
        let ids = vec!["g1".to_string(), "g2".to_string()];

        assert_eq!(repo.set_hidden_many(&ids, true).await.unwrap(), 2);
    }
}
