//! Feedback ticket service.

use chrono::Utc;
use gymhub_common::{AppError, AppResult};
use gymhub_db::{
    entities::feedback::{self, FeedbackPriority, FeedbackStatus},
    repositories::FeedbackRepository,
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::{BulkOutcome, dedup_ids, needing_change};

/// Admin update to one feedback ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackUpdate {
    pub status: Option<FeedbackStatus>,
    pub priority: Option<FeedbackPriority>,
    #[validate(length(max = 5000))]
    pub admin_response: Option<String>,
}

impl FeedbackUpdate {
    const fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none() && self.admin_response.is_none()
    }
}

/// Feedback service.
#[derive(Clone)]
pub struct FeedbackService {
    feedback_repo: FeedbackRepository,
}

impl FeedbackService {
    /// Create a new feedback service.
    #[must_use]
    pub const fn new(feedback_repo: FeedbackRepository) -> Self {
        Self { feedback_repo }
    }

    /// List all feedback.
    pub async fn list(&self) -> AppResult<Vec<feedback::Model>> {
        self.feedback_repo.list().await
    }

    /// Update status, priority or the admin response of a ticket.
    pub async fn update(
        &self,
        admin_id: &str,
        id: &str,
        update: FeedbackUpdate,
    ) -> AppResult<feedback::Model> {
        update.validate()?;
        if update.is_empty() {
            return Err(AppError::BadRequest("Nothing to update".to_string()));
        }

        let ticket = self.feedback_repo.get_by_id(id).await?;
        let mut model: feedback::ActiveModel = ticket.into();

        if let Some(status) = update.status {
            model.status = Set(status);
        }
        if let Some(priority) = update.priority {
            model.priority = Set(priority);
        }
        if let Some(response) = update.admin_response {
            let response = response.trim().to_string();
            model.admin_response = Set((!response.is_empty()).then_some(response));
        }
        model.updated_at = Set(Some(Utc::now().into()));

        let updated = self.feedback_repo.update(model).await?;
        info!(admin_id, feedback_id = id, status = updated.status.as_str(), "Feedback updated");
        Ok(updated)
    }

    /// Set the status of several tickets. Tickets already in that status
    /// are skipped.
    pub async fn bulk_update_status(
        &self,
        admin_id: &str,
        ids: &[String],
        status: FeedbackStatus,
    ) -> AppResult<BulkOutcome> {
        let ids = dedup_ids(ids);
        let tickets = self.feedback_repo.find_by_ids(&ids).await?;
        let to_change = needing_change(&tickets, |t| t.id.as_str(), |t| t.status == status);

        let applied = self.feedback_repo.set_status_many(&to_change, status).await?;

        let outcome = BulkOutcome::new(ids.len(), applied);
        info!(
            admin_id,
            status = status.as_str(),
            applied = outcome.applied,
            skipped = outcome.skipped,
            "Feedback bulk updated"
        );
        Ok(outcome)
    }

    /// Delete tickets by IDs.
    pub async fn delete(&self, admin_id: &str, ids: &[String]) -> AppResult<u64> {
        let deleted = self.feedback_repo.delete_many(&dedup_ids(ids)).await?;
        info!(admin_id, count = deleted, "Feedback deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_ticket(id: &str, status: FeedbackStatus) -> feedback::Model {
        feedback::Model {
            id: id.to_string(),
            user_id: Some("u1".to_string()),
            feedback_type: "feature".to_string(),
            title: "Dark mode".to_string(),
            message: "Please add dark mode".to_string(),
            status,
            priority: FeedbackPriority::Low,
            admin_response: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: DatabaseConnection) -> FeedbackService {
        FeedbackService::new(FeedbackRepository::new(Arc::new(db)))
    }

    #[tokio::test]
    async fn test_update_sets_response() {
        let mut updated = create_test_ticket("f1", FeedbackStatus::Resolved);
        updated.admin_response = Some("Shipped in 2.3".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_ticket("f1", FeedbackStatus::Open)]])
            .append_query_results([[updated]])
            .into_connection();

        let ticket = service(db)
            .update(
                "admin1",
                "f1",
                FeedbackUpdate {
                    status: Some(FeedbackStatus::Resolved),
                    priority: None,
                    admin_response: Some("Shipped in 2.3".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(ticket.status, FeedbackStatus::Resolved);
        assert_eq!(ticket.admin_response.as_deref(), Some("Shipped in 2.3"));
    }

    #[tokio::test]
    async fn test_update_empty_is_bad_request() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let result = service(db)
            .update("admin1", "f1", FeedbackUpdate::default())
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_bulk_status_skips_tickets_in_state() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[
                create_test_ticket("f1", FeedbackStatus::Closed),
                create_test_ticket("f2", FeedbackStatus::Open),
            ]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let ids = vec!["f1".to_string(), "f2".to_string()];
        let outcome = service(db)
            .bulk_update_status("admin1", &ids, FeedbackStatus::Closed)
            .await
            .unwrap();

        assert_eq!(outcome, BulkOutcome { applied: 1, skipped: 1 });
    }
}
