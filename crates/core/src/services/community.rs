//! Community administration service.

use gymhub_common::{AppError, AppResult};
use gymhub_db::{
    entities::{
        community,
        community_member::{self, MemberRole},
    },
    repositories::CommunityRepository,
};
use tracing::info;

use super::{BulkOutcome, dedup_ids, needing_change};

/// Service for suspending communities and managing their members.
#[derive(Clone)]
pub struct CommunityService {
    community_repo: CommunityRepository,
}

impl CommunityService {
    /// Create a new community service.
    #[must_use]
    pub const fn new(community_repo: CommunityRepository) -> Self {
        Self { community_repo }
    }

    /// List all communities.
    pub async fn list(&self) -> AppResult<Vec<community::Model>> {
        self.community_repo.list().await
    }

    /// Suspend (`active = false`) or reinstate one community.
    ///
    /// Returns whether a write happened; a community already in the
    /// target state is left alone.
    pub async fn set_active(&self, admin_id: &str, id: &str, active: bool) -> AppResult<bool> {
        let community = self.community_repo.get_by_id(id).await?;
        if community.is_active == active {
            return Ok(false);
        }

        self.community_repo
            .set_active_many(&[community.id], active)
            .await?;

        info!(admin_id, community_id = id, active, "Community state changed");
        Ok(true)
    }

    /// Suspend or reinstate several communities. Only communities not
    /// already in the target state are written.
    pub async fn bulk_set_active(
        &self,
        admin_id: &str,
        ids: &[String],
        active: bool,
    ) -> AppResult<BulkOutcome> {
        let ids = dedup_ids(ids);
        let communities = self.community_repo.find_by_ids(&ids).await?;
        let to_change = needing_change(&communities, |c| c.id.as_str(), |c| c.is_active == active);

        let applied = self
            .community_repo
            .set_active_many(&to_change, active)
            .await?;

        let outcome = BulkOutcome::new(ids.len(), applied);
        info!(
            admin_id,
            active,
            applied = outcome.applied,
            skipped = outcome.skipped,
            "Communities bulk updated"
        );
        Ok(outcome)
    }

    /// Delete communities by IDs.
    pub async fn delete(&self, admin_id: &str, ids: &[String]) -> AppResult<u64> {
        let deleted = self.community_repo.delete_many(&dedup_ids(ids)).await?;
        info!(admin_id, count = deleted, "Communities deleted");
        Ok(deleted)
    }

    /// Members of a community.
    pub async fn members(&self, community_id: &str) -> AppResult<Vec<community_member::Model>> {
        self.community_repo.get_by_id(community_id).await?;
        self.community_repo.find_members(community_id).await
    }

    /// Change a member's role. The last admin of a community cannot be
    /// demoted.
    pub async fn change_member_role(
        &self,
        admin_id: &str,
        community_id: &str,
        user_id: &str,
        role: MemberRole,
    ) -> AppResult<community_member::Model> {
        let member = self
            .community_repo
            .find_member(community_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member: {user_id}")))?;

        if member.role == role {
            return Ok(member);
        }

        if member.role == MemberRole::Admin {
            self.ensure_other_admin(community_id, "demote").await?;
        }

        self.community_repo
            .update_member_role(community_id, user_id, role)
            .await?;

        info!(
            admin_id,
            community_id,
            user_id,
            from = member.role.as_str(),
            to = role.as_str(),
            "Member role changed"
        );
        Ok(community_member::Model { role, ..member })
    }

    /// Remove a member from a community.
    pub async fn remove_member(
        &self,
        admin_id: &str,
        community_id: &str,
        user_id: &str,
    ) -> AppResult<()> {
        let member = self
            .community_repo
            .find_member(community_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member: {user_id}")))?;

        if member.role == MemberRole::Admin {
            self.ensure_other_admin(community_id, "remove").await?;
        }

        if self
            .community_repo
            .remove_member(community_id, user_id)
            .await?
            == 0
        {
            return Err(AppError::NotFound(format!("Member: {user_id}")));
        }

        info!(admin_id, community_id, user_id, "Member removed");
        Ok(())
    }

    /// Fail with `Conflict` unless the community keeps an admin after
    /// one of its admins leaves that role.
    async fn ensure_other_admin(&self, community_id: &str, action: &str) -> AppResult<()> {
        let admins = self
            .community_repo
            .find_members(community_id)
            .await?
            .iter()
            .filter(|m| m.role == MemberRole::Admin)
            .count();
        if admins <= 1 {
            return Err(AppError::Conflict(format!(
                "Cannot {action} the last community admin"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_community(id: &str, is_active: bool) -> community::Model {
        community::Model {
            id: id.to_string(),
            name: format!("Crew {id}"),
            description: None,
            rules: None,
            is_private: false,
            is_active,
            gym_id: None,
            community_type: "general".to_string(),
            created_by: "owner".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_member(user_id: &str, role: MemberRole) -> community_member::Model {
        community_member::Model {
            id: format!("m-{user_id}"),
            community_id: "c1".to_string(),
            user_id: user_id.to_string(),
            role,
            joined_at: Utc::now().into(),
        }
    }

    fn service(db: DatabaseConnection) -> CommunityService {
        CommunityService::new(CommunityRepository::new(Arc::new(db)))
    }

    #[tokio::test]
    async fn test_bulk_suspend_all_already_suspended() {
        // Nothing to write: no exec result is queued.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[
                create_test_community("c1", false),
                create_test_community("c2", false),
            ]])
            .into_connection();

        let ids = vec!["c1".to_string(), "c2".to_string()];
        let outcome = service(db).bulk_set_active("admin1", &ids, false).await.unwrap();

        assert_eq!(outcome, BulkOutcome { applied: 0, skipped: 2 });
    }

    #[tokio::test]
    async fn test_bulk_suspend_mixed_states() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[
                create_test_community("c1", true),
                create_test_community("c2", false),
                create_test_community("c3", true),
            ]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();

        let ids = vec!["c1".to_string(), "c2".to_string(), "c3".to_string()];
        let outcome = service(db).bulk_set_active("admin1", &ids, false).await.unwrap();

        assert_eq!(outcome, BulkOutcome { applied: 2, skipped: 1 });
    }

    #[tokio::test]
    async fn test_set_active_noop_when_already_active() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_community("c1", true)]])
            .into_connection();

        let changed = service(db).set_active("admin1", "c1", true).await.unwrap();
        assert!(!changed);
    }

    #[tokio::test]
    async fn test_cannot_demote_last_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_member("u1", MemberRole::Admin)]])
            .append_query_results([[
                create_test_member("u1", MemberRole::Admin),
                create_test_member("u2", MemberRole::Member),
            ]])
            .into_connection();

        let result = service(db)
            .change_member_role("admin1", "c1", "u1", MemberRole::Member)
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_cannot_remove_last_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_member("u1", MemberRole::Admin)]])
            .append_query_results([[
                create_test_member("u1", MemberRole::Admin),
                create_test_member("u2", MemberRole::Moderator),
            ]])
            .into_connection();

        let result = service(db).remove_member("admin1", "c1", "u1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_remove_admin_when_another_remains() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_member("u1", MemberRole::Admin)]])
            .append_query_results([[
                create_test_member("u1", MemberRole::Admin),
                create_test_member("u3", MemberRole::Admin),
            ]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        service(db)
            .remove_member("admin1", "c1", "u1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_remove_missing_member_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<community_member::Model>::new()])
            .into_connection();

        let result = service(db).remove_member("admin1", "c1", "ghost").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_promote_member_to_moderator() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_member("u2", MemberRole::Member)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let member = service(db)
            .change_member_role("admin1", "c1", "u2", MemberRole::Moderator)
            .await
            .unwrap();

        assert_eq!(member.role, MemberRole::Moderator);
        assert!(member.role.can_moderate());
    }
}
