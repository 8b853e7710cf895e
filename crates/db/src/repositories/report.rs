//! Content report repository.

use std::sync::Arc;

use crate::entities::{
    ContentReport,
    content_report::{self, ReportStatus, ReportSubject},
};
use chrono::{DateTime, FixedOffset};
use gymhub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, sea_query::Expr,
};

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Begin a transaction on the underlying connection.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db.begin().await.map_err(AppError::from_db)
    }

    /// Create a new report.
    pub async fn create(
        &self,
        model: content_report::ActiveModel,
    ) -> AppResult<content_report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Find a report by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<content_report::Model>> {
        ContentReport::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Get a report by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<content_report::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report: {id}")))
    }

    /// Latest reports of every kind, newest first.
    pub async fn list(&self, limit: u64) -> AppResult<Vec<content_report::Model>> {
        ContentReport::find()
            .order_by_desc(content_report::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Pending reports of every kind, newest first.
    pub async fn find_pending(&self) -> AppResult<Vec<content_report::Model>> {
        ContentReport::find()
            .filter(content_report::Column::Status.eq(ReportStatus::Pending))
            .order_by_desc(content_report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Close pending reports, either by ID or every report on one subject.
    ///
    /// Only rows still `pending` are written.
    pub async fn close_pending_in<C: ConnectionTrait>(
        conn: &C,
        target: CloseTarget<'_>,
        status: ReportStatus,
        reviewed_by: &str,
        reviewed_at: DateTime<FixedOffset>,
    ) -> AppResult<u64> {
        let mut update = ContentReport::update_many()
            .col_expr(content_report::Column::Status, Expr::value(status))
            .col_expr(
                content_report::Column::ReviewedBy,
                Expr::value(Some(reviewed_by.to_string())),
            )
            .col_expr(
                content_report::Column::ReviewedAt,
                Expr::value(Some(reviewed_at)),
            )
            .filter(content_report::Column::Status.eq(ReportStatus::Pending));

        update = match target {
            CloseTarget::Report(id) => update.filter(content_report::Column::Id.eq(id)),
            CloseTarget::Subject(kind, subject_id) => update
                .filter(content_report::Column::SubjectKind.eq(kind))
                .filter(content_report::Column::SubjectId.eq(subject_id)),
        };

        let result = update.exec(conn).await.map_err(AppError::from_db)?;
        Ok(result.rows_affected)
    }

    /// Close one pending report outside a transaction.
    pub async fn close_pending(
        &self,
        id: &str,
        status: ReportStatus,
        reviewed_by: &str,
        reviewed_at: DateTime<FixedOffset>,
    ) -> AppResult<u64> {
        Self::close_pending_in(
            self.db.as_ref(),
            CloseTarget::Report(id),
            status,
            reviewed_by,
            reviewed_at,
        )
        .await
    }
}

/// Which pending reports to close.
#[derive(Debug, Clone, Copy)]
pub enum CloseTarget<'a> {
    /// A single report.
    Report(&'a str),
    /// Every report on one subject.
    Subject(ReportSubject, &'a str),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_report(id: &str, kind: ReportSubject) -> content_report::Model {
        content_report::Model {
            id: id.to_string(),
            subject_kind: kind,
            subject_id: "p1".to_string(),
            reported_by: "u1".to_string(),
            reason: "spam".to_string(),
            details: None,
            status: ReportStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_pending_mixes_kinds() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[
                create_test_report("r1", ReportSubject::Post),
                create_test_report("r2", ReportSubject::Community),
            ]])
            .into_connection();

        let repo = ReportRepository::new(Arc::new(db));
        let pending = repo.find_pending().await.unwrap();

        assert_eq!(pending.len(), 2);
        assert_eq!(pending[1].subject_kind, ReportSubject::Community);
    }

    #[tokio::test]
    async fn test_close_pending_already_closed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = ReportRepository::new(Arc::new(db));
        let changed = repo
            .close_pending("r1", ReportStatus::Dismissed, "admin1", Utc::now().fixed_offset())
            .await
            .unwrap();

        assert_eq!(changed, 0);
    }
}
