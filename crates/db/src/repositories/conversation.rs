//! Direct conversation repository.

use std::sync::Arc;

use crate::entities::{Conversation, conversation, conversation_participant};
use gymhub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    TransactionTrait,
};

/// Conversation repository for database operations.
#[derive(Clone)]
pub struct ConversationRepository {
    db: Arc<DatabaseConnection>,
}

impl ConversationRepository {
    /// Create a new conversation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a direct conversation by its pair key.
    pub async fn find_by_direct_key(&self, key: &str) -> AppResult<Option<conversation::Model>> {
        Conversation::find()
            .filter(conversation::Column::DirectKey.eq(key))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Create a conversation with its participants in one transaction.
    pub async fn create_with_participants(
        &self,
        model: conversation::ActiveModel,
        participants: Vec<conversation_participant::ActiveModel>,
    ) -> AppResult<conversation::Model> {
        let txn = self.db.begin().await.map_err(AppError::from_db)?;

        let created = model.insert(&txn).await.map_err(AppError::from_db)?;
        for participant in participants {
            participant.insert(&txn).await.map_err(AppError::from_db)?;
        }

        txn.commit().await.map_err(AppError::from_db)?;
        Ok(created)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_by_direct_key() {
        let conv = conversation::Model {
            id: "cv1".to_string(),
            direct_key: "alice:bob".to_string(),
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[conv.clone()]])
            .into_connection();

        let repo = ConversationRepository::new(Arc::new(db));
        assert_eq!(repo.find_by_direct_key("alice:bob").await.unwrap(), Some(conv));
    }
}
