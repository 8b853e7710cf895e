//! Feedback repository.

use std::sync::Arc;

use crate::entities::{
    Feedback,
    feedback::{self, FeedbackStatus},
};
use chrono::Utc;
use gymhub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};

/// Feedback repository for database operations.
#[derive(Clone)]
pub struct FeedbackRepository {
    db: Arc<DatabaseConnection>,
}

impl FeedbackRepository {
    /// Create a new feedback repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a feedback ticket by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<feedback::Model>> {
        Feedback::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Get a feedback ticket by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<feedback::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Feedback: {id}")))
    }

    /// Find feedback tickets by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<feedback::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Feedback::find()
            .filter(feedback::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// List all feedback, newest first.
    pub async fn list(&self) -> AppResult<Vec<feedback::Model>> {
        Feedback::find()
            .order_by_desc(feedback::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Update a feedback ticket.
    pub async fn update(&self, model: feedback::ActiveModel) -> AppResult<feedback::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Set the status of the given tickets.
    pub async fn set_status_many(&self, ids: &[String], status: FeedbackStatus) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Feedback::update_many()
            .col_expr(feedback::Column::Status, Expr::value(status))
            .col_expr(
                feedback::Column::UpdatedAt,
                Expr::value(Some(Utc::now().fixed_offset())),
            )
            .filter(feedback::Column::Id.is_in(ids.iter().cloned()))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(result.rows_affected)
    }

    /// Delete feedback tickets by IDs.
    pub async fn delete_many(&self, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Feedback::delete_many()
            .filter(feedback::Column::Id.is_in(ids.iter().cloned()))
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
    use crate::entities::feedback::FeedbackPriority;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_get_by_id() {
        let ticket = feedback::Model {
            id: "f1".to_string(),
            user_id: None,
            feedback_type: "bug".to_string(),
            title: "Map pins missing".to_string(),
            message: "Gyms in Lisbon do not show up".to_string(),
            status: FeedbackStatus::Open,
            priority: FeedbackPriority::High,
            admin_response: None,
            created_at: Utc::now().into(),
            updated_at: None,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[ticket.clone()]])
            .into_connection();

        let repo = FeedbackRepository::new(Arc::new(db));
        assert_eq!(repo.get_by_id("f1").await.unwrap(), ticket);
    }

    #[tokio::test]
    async fn test_set_status_many() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();

        let repo = FeedbackRepository::new(Arc::new(db));
        let ids = vec!["f1".to_string(), "f2".to_string()];

        assert_eq!(
            repo.set_status_many(&ids, FeedbackStatus::Resolved).await.unwrap(),
            2
        );
    }
}
