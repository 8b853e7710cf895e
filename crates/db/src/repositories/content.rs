//! Post and comment repository.

use std::sync::Arc;

use crate::entities::{Comment, Post, comment, post};
use gymhub_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Repository for community posts and their comments.
#[derive(Clone)]
pub struct ContentRepository {
    db: Arc<DatabaseConnection>,
}

impl ContentRepository {
    /// Create a new content repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Latest posts, newest first.
    pub async fn recent_posts(&self, limit: u64) -> AppResult<Vec<post::Model>> {
        Post::find()
            .order_by_desc(post::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Latest comments, newest first.
    pub async fn recent_comments(&self, limit: u64) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .order_by_desc(comment::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Find a post by ID.
    pub async fn find_post(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Find a comment by ID.
    pub async fn find_comment(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Delete posts by IDs.
    pub async fn delete_posts(&self, ids: &[String]) -> AppResult<u64> {
        Self::delete_posts_in(self.db.as_ref(), ids).await
    }

    /// Delete comments by IDs.
    pub async fn delete_comments(&self, ids: &[String]) -> AppResult<u64> {
        Self::delete_comments_in(self.db.as_ref(), ids).await
    }

    /// Delete posts on any connection, transactions included.
    pub async fn delete_posts_in<C: ConnectionTrait>(conn: &C, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Post::delete_many()
            .filter(post::Column::Id.is_in(ids.iter().cloned()))
            .exec(conn)
            .await
            .map_err(AppError::from_db)?;

        Ok(result.rows_affected)
    }

    /// Delete comments on any connection, transactions included.
    pub async fn delete_comments_in<C: ConnectionTrait>(
        conn: &C,
        ids: &[String],
    ) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Comment::delete_many()
            .filter(comment::Column::Id.is_in(ids.iter().cloned()))
            .exec(conn)
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

    #[tokio::test]
    async fn test_recent_posts() {
        let post = post::Model {
            id: "p1".to_string(),
            community_id: "c1".to_string(),
            author_id: "u1".to_string(),
            title: Some("Send train".to_string()),
            content: "Projecting the roof line".to_string(),
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[post.clone()]])
            .into_connection();

        let repo = ContentRepository::new(Arc::new(db));
        let posts = repo.recent_posts(100).await.unwrap();

        assert_eq!(posts, vec![post]);
    }

    #[tokio::test]
    async fn test_delete_comments() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();

        let repo = ContentRepository::new(Arc::new(db));
        let ids = vec!["c1".to_string(), "c2".to_string()];

        assert_eq!(repo.delete_comments(&ids).await.unwrap(), 2);
    }
}
