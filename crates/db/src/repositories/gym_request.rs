//! Gym request repository.

use std::sync::Arc;

use crate::entities::{
    GymRequest, GymRequestHistory,
    gym_request::{self, GymRequestStatus},
    gym_request_history,
};
use chrono::{DateTime, FixedOffset};
use gymhub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    sea_query::{CaseStatement, Expr},
};

/// Review stamp written when a request leaves `pending`.
#[derive(Debug, Clone)]
pub struct ReviewStamp {
    /// Admin who reviewed the request.
    pub reviewed_by: String,
    /// Review time.
    pub reviewed_at: DateTime<FixedOffset>,
    /// Optional admin notes.
    pub admin_notes: Option<String>,
}

/// Gym request repository for database operations.
#[derive(Clone)]
pub struct GymRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl GymRequestRepository {
    /// Create a new gym request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Begin a transaction on the underlying connection.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db.begin().await.map_err(AppError::from_db)
    }

    /// Find a request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<gym_request::Model>> {
        GymRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Get a request by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<gym_request::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Gym request: {id}")))
    }

    /// Find requests by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<gym_request::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        GymRequest::find()
            .filter(gym_request::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// List requests, newest first, optionally by status.
    pub async fn list(
        &self,
        status: Option<GymRequestStatus>,
    ) -> AppResult<Vec<gym_request::Model>> {
        let mut query = GymRequest::find().order_by_desc(gym_request::Column::CreatedAt);

        if let Some(status) = status {
            query = query.filter(gym_request::Column::Status.eq(status));
        }

        query.all(self.db.as_ref()).await.map_err(AppError::from_db)
    }

    /// Update a request.
    pub async fn update(
        &self,
        model: gym_request::ActiveModel,
    ) -> AppResult<gym_request::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Move requests from one status to another, only where the current
    /// status still matches `from`. Returns the number of rows changed.
    pub async fn transition_many(
        &self,
        ids: &[String],
        from: GymRequestStatus,
        to: GymRequestStatus,
        stamp: Option<ReviewStamp>,
    ) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let (reviewed_by, reviewed_at, admin_notes) = match stamp {
            Some(s) => (Some(s.reviewed_by), Some(s.reviewed_at), s.admin_notes),
            None => (None, None, None),
        };

        let result = GymRequest::update_many()
            .col_expr(gym_request::Column::Status, Expr::value(to))
            .col_expr(gym_request::Column::ReviewedBy, Expr::value(reviewed_by))
            .col_expr(gym_request::Column::ReviewedAt, Expr::value(reviewed_at))
            .col_expr(gym_request::Column::AdminNotes, Expr::value(admin_notes))
            .filter(gym_request::Column::Id.is_in(ids.iter().cloned()))
            .filter(gym_request::Column::Status.eq(from))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(result.rows_affected)
    }

    /// Delete requests by IDs.
    pub async fn delete_many(&self, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = GymRequest::delete_many()
            .filter(gym_request::Column::Id.is_in(ids.iter().cloned()))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(result.rows_affected)
    }

    // ==================== History ====================

    /// Append a history entry.
    pub async fn append_history(
        &self,
        model: gym_request_history::ActiveModel,
    ) -> AppResult<gym_request_history::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// History of one request, oldest first.
    pub async fn find_history(
        &self,
        request_id: &str,
    ) -> AppResult<Vec<gym_request_history::Model>> {
        GymRequestHistory::find()
            .filter(gym_request_history::Column::GymRequestId.eq(request_id))
            .order_by_asc(gym_request_history::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    // ==================== Transactional ====================

    /// Load requests and lock their rows until the transaction ends.
    pub async fn lock_many_in(
        txn: &DatabaseTransaction,
        ids: &[String],
    ) -> AppResult<Vec<gym_request::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        GymRequest::find()
            .filter(gym_request::Column::Id.is_in(ids.iter().cloned()))
            .order_by_asc(gym_request::Column::CreatedAt)
            .lock_exclusive()
            .all(txn)
            .await
            .map_err(AppError::from_db)
    }

    /// Mark pending requests approved, linking each to the gym created
    /// for it. Rows that are no longer pending are left untouched.
    pub async fn approve_many_in(
        txn: &DatabaseTransaction,
        approvals: &[(String, String)],
        stamp: ReviewStamp,
    ) -> AppResult<u64> {
        if approvals.is_empty() {
            return Ok(0);
        }

        let gym_ids = approvals
            .iter()
            .fold(CaseStatement::new(), |case, (request_id, gym_id)| {
                case.case(
                    gym_request::Column::Id.eq(request_id.as_str()),
                    Expr::value(gym_id.as_str()),
                )
            })
            .finally(Expr::col(gym_request::Column::ApprovedGymId));

        let result = GymRequest::update_many()
            .col_expr(
                gym_request::Column::Status,
                Expr::value(GymRequestStatus::Approved),
            )
            .col_expr(gym_request::Column::ApprovedGymId, gym_ids.into())
            .col_expr(
                gym_request::Column::ReviewedBy,
                Expr::value(Some(stamp.reviewed_by)),
            )
            .col_expr(
                gym_request::Column::ReviewedAt,
                Expr::value(Some(stamp.reviewed_at)),
            )
            .col_expr(gym_request::Column::AdminNotes, Expr::value(stamp.admin_notes))
            .filter(
                gym_request::Column::Id.is_in(approvals.iter().map(|(request_id, _)| request_id.clone())),
            )
            .filter(gym_request::Column::Status.eq(GymRequestStatus::Pending))
            .exec(txn)
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
    use serde_json::json;

    fn create_test_request(id: &str, status: GymRequestStatus) -> gym_request::Model {
        gym_request::Model {
            id: id.to_string(),
            gym_name: "Boulder Barn".to_string(),
            country: "USA".to_string(),
            city: "Austin".to_string(),
            address: None,
            description: None,
            website: None,
            facilities: json!([]),
            difficulty_levels: json!([]),
            opening_hours: json!({}),
            requested_by: "user1".to_string(),
            status,
            reviewed_by: None,
            reviewed_at: None,
            admin_notes: None,
            approved_gym_id: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_list_by_status() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_request("r1", GymRequestStatus::Pending)]])
            .into_connection();

        let repo = GymRequestRepository::new(Arc::new(db));
        let pending = repo.list(Some(GymRequestStatus::Pending)).await.unwrap();

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].status, GymRequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_transition_many_counts_only_matching_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let repo = GymRequestRepository::new(Arc::new(db));
        let ids = vec!["r1".to_string(), "r2".to_string()];
        let changed = repo
            .transition_many(
                &ids,
                GymRequestStatus::Rejected,
                GymRequestStatus::Pending,
                None,
            )
            .await
            .unwrap();

        assert_eq!(changed, 1);
    }

    #[tokio::test]
    async fn test_find_history_empty() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<gym_request_history::Model>::new()])
            .into_connection();

        let repo = GymRequestRepository::new(Arc::new(db));
        assert!(repo.find_history("r1").await.unwrap().is_empty());
    }
}
