//! Content report service and post/comment removal.

use chrono::Utc;
use gymhub_common::{AppError, AppResult, IdGenerator};
use gymhub_db::{
    entities::content_report::{self, ReportStatus, ReportSubject},
    repositories::{CloseTarget, CommunityRepository, ContentRepository, ReportRepository},
};
use sea_orm::{DatabaseTransaction, Set};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::{dedup_ids, finish_transaction};

/// How an admin resolves a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Close the report without touching the subject.
    Dismiss,
    /// Delete the reported subject and close every pending report on it.
    TakeAction,
}

impl Resolution {
    const fn status(self) -> ReportStatus {
        match self {
            Self::Dismiss => ReportStatus::Dismissed,
            Self::TakeAction => ReportStatus::ActionTaken,
        }
    }
}

/// Input for filing a report.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportInput {
    pub subject_kind: ReportSubject,
    pub subject_id: String,
    #[validate(length(min = 1, max = 200))]
    pub reason: String,
    #[validate(length(max = 2000))]
    pub details: Option<String>,
}

/// Result of resolving a report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOutcome {
    pub report_id: String,
    pub status: ReportStatus,
    /// Whether the reported subject was deleted.
    pub subject_deleted: bool,
    /// Pending reports closed, this one included.
    pub reports_closed: u64,
}

/// Report service.
#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    content_repo: ContentRepository,
    community_repo: CommunityRepository,
    id_gen: IdGenerator,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        content_repo: ContentRepository,
        community_repo: CommunityRepository,
    ) -> Self {
        Self {
            report_repo,
            content_repo,
            community_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// File a report against a post, comment or community.
    pub async fn create(
        &self,
        reporter_id: &str,
        input: CreateReportInput,
    ) -> AppResult<content_report::Model> {
        input.validate()?;

        let exists = match input.subject_kind {
            ReportSubject::Post => self.content_repo.find_post(&input.subject_id).await?.is_some(),
            ReportSubject::Comment => self
                .content_repo
                .find_comment(&input.subject_id)
                .await?
                .is_some(),
            ReportSubject::Community => self
                .community_repo
                .find_by_id(&input.subject_id)
                .await?
                .is_some(),
        };
        if !exists {
            return Err(AppError::NotFound(format!(
                "{}: {}",
                input.subject_kind.as_str(),
                input.subject_id
            )));
        }

        let model = content_report::ActiveModel {
            id: Set(self.id_gen.generate()),
            subject_kind: Set(input.subject_kind),
            subject_id: Set(input.subject_id),
            reported_by: Set(reporter_id.to_string()),
            reason: Set(input.reason.trim().to_string()),
            details: Set(input.details),
            status: Set(ReportStatus::Pending),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            created_at: Set(Utc::now().into()),
        };

        self.report_repo.create(model).await
    }

    /// Latest reports of every kind.
    pub async fn list(&self, limit: u64) -> AppResult<Vec<content_report::Model>> {
        self.report_repo.list(limit).await
    }

    /// Pending reports across all kinds, newest first.
    pub async fn moderation_queue(&self) -> AppResult<Vec<content_report::Model>> {
        self.report_repo.find_pending().await
    }

    /// Resolve a pending report.
    pub async fn resolve(
        &self,
        admin_id: &str,
        report_id: &str,
        resolution: Resolution,
    ) -> AppResult<ResolveOutcome> {
        let report = self.report_repo.get_by_id(report_id).await?;
        if report.status != ReportStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "report is already {}",
                report.status.as_str()
            )));
        }

        let now = Utc::now().fixed_offset();
        let outcome = match resolution {
            Resolution::Dismiss => {
                let closed = self
                    .report_repo
                    .close_pending(report_id, ReportStatus::Dismissed, admin_id, now)
                    .await?;
                if closed == 0 {
                    return Err(AppError::Conflict(
                        "Report was resolved concurrently".to_string(),
                    ));
                }
                ResolveOutcome {
                    report_id: report.id,
                    status: resolution.status(),
                    subject_deleted: false,
                    reports_closed: closed,
                }
            }
            Resolution::TakeAction => {
                let txn = self.report_repo.begin().await?;
                let result = Self::take_action_in(&txn, &report, admin_id, now).await;
                let (deleted, closed) = finish_transaction(txn, result).await?;
                ResolveOutcome {
                    report_id: report.id,
                    status: resolution.status(),
                    subject_deleted: deleted > 0,
                    reports_closed: closed,
                }
            }
        };

        info!(
            admin_id,
            report_id,
            resolution = outcome.status.as_str(),
            closed = outcome.reports_closed,
            "Report resolved"
        );
        Ok(outcome)
    }

    async fn take_action_in(
        txn: &DatabaseTransaction,
        report: &content_report::Model,
        admin_id: &str,
        now: chrono::DateTime<chrono::FixedOffset>,
    ) -> AppResult<(u64, u64)> {
        let ids = [report.subject_id.clone()];
        let deleted = match report.subject_kind {
            ReportSubject::Post => ContentRepository::delete_posts_in(txn, &ids).await?,
            ReportSubject::Comment => ContentRepository::delete_comments_in(txn, &ids).await?,
            ReportSubject::Community => CommunityRepository::delete_many_in(txn, &ids).await?,
        };

        let closed = ReportRepository::close_pending_in(
            txn,
            CloseTarget::Subject(report.subject_kind, &report.subject_id),
            ReportStatus::ActionTaken,
            admin_id,
            now,
        )
        .await?;
        if closed == 0 {
            return Err(AppError::Conflict(
                "Report was resolved concurrently".to_string(),
            ));
        }

        Ok((deleted, closed))
    }

    /// Delete posts by IDs.
    pub async fn delete_posts(&self, admin_id: &str, ids: &[String]) -> AppResult<u64> {
        let deleted = self.content_repo.delete_posts(&dedup_ids(ids)).await?;
        info!(admin_id, count = deleted, "Posts deleted");
        Ok(deleted)
    }

    /// Delete comments by IDs.
    pub async fn delete_comments(&self, admin_id: &str, ids: &[String]) -> AppResult<u64> {
        let deleted = self.content_repo.delete_comments(&dedup_ids(ids)).await?;
        info!(admin_id, count = deleted, "Comments deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gymhub_db::entities::post;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_report(kind: ReportSubject, status: ReportStatus) -> content_report::Model {
        content_report::Model {
            id: "r1".to_string(),
            subject_kind: kind,
            subject_id: "p1".to_string(),
            reported_by: "u1".to_string(),
            reason: "spam".to_string(),
            details: None,
            status,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now().into(),
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn service(db: DatabaseConnection) -> ReportService {
        let db = Arc::new(db);
        ReportService::new(
            ReportRepository::new(Arc::clone(&db)),
            ContentRepository::new(Arc::clone(&db)),
            CommunityRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_dismiss_keeps_subject() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_report(
                ReportSubject::Post,
                ReportStatus::Pending,
            )]])
            .append_exec_results([exec(1)])
            .into_connection();

        let outcome = service(db)
            .resolve("admin1", "r1", Resolution::Dismiss)
            .await
            .unwrap();

        assert_eq!(outcome.status, ReportStatus::Dismissed);
        assert!(!outcome.subject_deleted);
    }

    #[tokio::test]
    async fn test_take_action_deletes_subject_and_closes_siblings() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_report(
                ReportSubject::Post,
                ReportStatus::Pending,
            )]])
            .append_exec_results([exec(1), exec(3)])
            .into_connection();

        let outcome = service(db)
            .resolve("admin1", "r1", Resolution::TakeAction)
            .await
            .unwrap();

        assert_eq!(outcome.status, ReportStatus::ActionTaken);
        assert!(outcome.subject_deleted);
        assert_eq!(outcome.reports_closed, 3);
    }

    #[tokio::test]
    async fn test_resolve_closed_report_is_invalid() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_report(
                ReportSubject::Comment,
                ReportStatus::Dismissed,
            )]])
            .into_connection();

        let result = service(db)
            .resolve("admin1", "r1", Resolution::TakeAction)
            .await;

        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_create_report_for_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let result = service(db)
            .create(
                "u1",
                CreateReportInput {
                    subject_kind: ReportSubject::Post,
                    subject_id: "p404".to_string(),
                    reason: "spam".to_string(),
                    details: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
