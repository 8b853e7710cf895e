//! Community and membership repository.

use std::sync::Arc;

use crate::entities::{
    Community, CommunityMember, Post, community,
    community_member::{self, MemberRole},
    post,
};
use gymhub_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::Expr,
};

/// Community repository for database operations.
#[derive(Clone)]
pub struct CommunityRepository {
    db: Arc<DatabaseConnection>,
}

impl CommunityRepository {
    /// Create a new community repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a community by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<community::Model>> {
        Community::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Get a community by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<community::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Community: {id}")))
    }

    /// Find communities by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<community::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Community::find()
            .filter(community::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// List all communities, newest first.
    pub async fn list(&self) -> AppResult<Vec<community::Model>> {
        Community::find()
            .order_by_desc(community::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Set the active flag on the given communities.
    pub async fn set_active_many(&self, ids: &[String], active: bool) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Community::update_many()
            .col_expr(community::Column::IsActive, Expr::value(active))
            .filter(community::Column::Id.is_in(ids.iter().cloned()))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(result.rows_affected)
    }

    /// Delete communities by IDs.
    pub async fn delete_many(&self, ids: &[String]) -> AppResult<u64> {
        Self::delete_many_in(self.db.as_ref(), ids).await
    }

    /// Delete communities on any connection, transactions included.
    pub async fn delete_many_in<C: ConnectionTrait>(conn: &C, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Community::delete_many()
            .filter(community::Column::Id.is_in(ids.iter().cloned()))
            .exec(conn)
            .await
            .map_err(AppError::from_db)?;

        Ok(result.rows_affected)
    }

    // ==================== Members ====================

    /// Members of one community, oldest first.
    pub async fn find_members(
        &self,
        community_id: &str,
    ) -> AppResult<Vec<community_member::Model>> {
        CommunityMember::find()
            .filter(community_member::Column::CommunityId.eq(community_id))
            .order_by_asc(community_member::Column::JoinedAt)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Members of every listed community.
    pub async fn find_members_for(
        &self,
        community_ids: &[String],
    ) -> AppResult<Vec<community_member::Model>> {
        if community_ids.is_empty() {
            return Ok(vec![]);
        }

        CommunityMember::find()
            .filter(community_member::Column::CommunityId.is_in(community_ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Find one membership.
    pub async fn find_member(
        &self,
        community_id: &str,
        user_id: &str,
    ) -> AppResult<Option<community_member::Model>> {
        CommunityMember::find()
            .filter(community_member::Column::CommunityId.eq(community_id))
            .filter(community_member::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Change a member's role.
    pub async fn update_member_role(
        &self,
        community_id: &str,
        user_id: &str,
        role: MemberRole,
    ) -> AppResult<u64> {
        let result = CommunityMember::update_many()
            .col_expr(community_member::Column::Role, Expr::value(role))
            .filter(community_member::Column::CommunityId.eq(community_id))
            .filter(community_member::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(result.rows_affected)
    }

    /// Remove a member from a community.
    pub async fn remove_member(&self, community_id: &str, user_id: &str) -> AppResult<u64> {
        let result = CommunityMember::delete_many()
            .filter(community_member::Column::CommunityId.eq(community_id))
            .filter(community_member::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(result.rows_affected)
    }

    /// Post count per community, for the listed communities.
    pub async fn count_posts_for(&self, community_ids: &[String]) -> AppResult<Vec<(String, i64)>> {
        if community_ids.is_empty() {
            return Ok(vec![]);
        }

        Post::find()
            .select_only()
            .column(post::Column::CommunityId)
            .column_as(Expr::col(post::Column::Id).count(), "post_count")
            .filter(post::Column::CommunityId.is_in(community_ids.iter().cloned()))
            .group_by(post::Column::CommunityId)
            .into_tuple::<(String, i64)>()
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_member(user_id: &str, role: MemberRole) -> community_member::Model {
        community_member::Model {
            id: format!("m-{user_id}"),
            community_id: "c1".to_string(),
            user_id: user_id.to_string(),
            role,
            joined_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_members() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[
                create_test_member("u1", MemberRole::Admin),
                create_test_member("u2", MemberRole::Member),
            ]])
            .into_connection();

        let repo = CommunityRepository::new(Arc::new(db));
        let members = repo.find_members("c1").await.unwrap();

        assert_eq!(members.len(), 2);
        assert_eq!(members[0].role, MemberRole::Admin);
    }

    #[tokio::test]
    async fn test_set_active_many_empty_is_noop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = CommunityRepository::new(Arc::new(db));

        assert_eq!(repo.set_active_many(&[], false).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remove_member() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let repo = CommunityRepository::new(Arc::new(db));
        assert_eq!(repo.remove_member("c1", "u2").await.unwrap(), 1);
    }
}
