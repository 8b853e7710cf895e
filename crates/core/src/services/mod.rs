//! Business logic services.

#![allow(missing_docs)]

pub mod community;
pub mod conversation;
pub mod feedback;
pub mod gym;
pub mod gym_request;
pub mod moderation;
pub mod report;
pub mod session;
pub mod user;

pub use community::CommunityService;
pub use conversation::{ConversationService, DirectConversation};
pub use feedback::{FeedbackService, FeedbackUpdate};
pub use gym::{GymPatch, GymService};
pub use gym_request::{
    ApprovalOutcome, GymRequestPatch, GymRequestService, GymVisibility, strip_provenance,
};
pub use moderation::{
    BlockInput, ModerationService, ModerationStatus, MuteInput, SuspendInput,
};
pub use report::{CreateReportInput, ReportService, Resolution, ResolveOutcome};
pub use session::{SessionService, require_admin};
pub use user::UserService;

use gymhub_common::{AppError, AppResult};
use sea_orm::DatabaseTransaction;
use serde::Serialize;

/// Result of a bulk operation that only writes rows not already in the
/// target state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    /// Rows actually written.
    pub applied: u64,
    /// Requested rows left alone: already in state, missing, or not eligible.
    pub skipped: u64,
}

impl BulkOutcome {
    /// Build an outcome from the requested count and the rows written.
    #[must_use]
    pub const fn new(requested: usize, applied: u64) -> Self {
        Self {
            applied,
            skipped: (requested as u64).saturating_sub(applied),
        }
    }
}

/// IDs of the rows not yet in the target state.
pub(crate) fn needing_change<T>(
    rows: &[T],
    id: impl Fn(&T) -> &str,
    in_target_state: impl Fn(&T) -> bool,
) -> Vec<String> {
    rows.iter()
        .filter(|row| !in_target_state(row))
        .map(|row| id(row).to_string())
        .collect()
}

/// Sort and deduplicate a list of IDs.
pub(crate) fn dedup_ids(ids: &[String]) -> Vec<String> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Commit on success, roll back on error.
pub(crate) async fn finish_transaction<T>(
    txn: DatabaseTransaction,
    result: AppResult<T>,
) -> AppResult<T> {
    match result {
        Ok(value) => {
            txn.commit().await.map_err(AppError::from_db)?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!(error = %rollback_err, "Transaction rollback failed");
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_outcome_counts() {
        let outcome = BulkOutcome::new(5, 2);
        assert_eq!(outcome.applied, 2);
        assert_eq!(outcome.skipped, 3);
    }

    #[test]
    fn test_needing_change_filters_rows_in_state() {
        let rows = vec![("a", true), ("b", false), ("c", true)];
        let ids = needing_change(&rows, |r| r.0, |r| r.1);
        assert_eq!(ids, vec!["b".to_string()]);
    }

    #[test]
    fn test_dedup_ids() {
        let ids = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(dedup_ids(&ids), vec!["a".to_string(), "b".to_string()]);
    }
}
