//! Direct conversations between two users.

use chrono::Utc;
use gymhub_common::{AppError, AppResult, IdGenerator};
use gymhub_db::{
    entities::{conversation, conversation_participant},
    repositories::{BlockRepository, ConversationRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// A direct conversation and whether this call created it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectConversation {
    pub conversation: conversation::Model,
    pub created: bool,
}

/// Conversation service.
#[derive(Clone)]
pub struct ConversationService {
    conversation_repo: ConversationRepository,
    block_repo: BlockRepository,
    id_gen: IdGenerator,
}

impl ConversationService {
    /// Create a new conversation service.
    #[must_use]
    pub const fn new(conversation_repo: ConversationRepository, block_repo: BlockRepository) -> Self {
        Self {
            conversation_repo,
            block_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Return the two-party conversation between `user_a` and `user_b`,
    /// creating it with both participants if it does not exist.
    pub async fn get_or_create_direct(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> AppResult<DirectConversation> {
        if user_a == user_b {
            return Err(AppError::BadRequest(
                "Cannot start a conversation with yourself".to_string(),
            ));
        }

        if self.block_repo.is_blocked_either_way(user_a, user_b).await? {
            return Err(AppError::Forbidden(
                "Conversation blocked between these users".to_string(),
            ));
        }

        let key = direct_key(user_a, user_b);
        if let Some(existing) = self.conversation_repo.find_by_direct_key(&key).await? {
            return Ok(DirectConversation {
                conversation: existing,
                created: false,
            });
        }

        let now = Utc::now();
        let conversation_id = self.id_gen.generate();
        let participants = [user_a, user_b]
            .into_iter()
            .map(|user_id| conversation_participant::ActiveModel {
                id: Set(self.id_gen.generate()),
                conversation_id: Set(conversation_id.clone()),
                user_id: Set(user_id.to_string()),
                joined_at: Set(now.into()),
            })
            .collect();

        let created = self
            .conversation_repo
            .create_with_participants(
                conversation::ActiveModel {
                    id: Set(conversation_id),
                    direct_key: Set(key),
                    created_at: Set(now.into()),
                },
                participants,
            )
            .await?;

        Ok(DirectConversation {
            conversation: created,
            created: true,
        })
    }
}

/// Order-independent key for a user pair.
fn direct_key(user_a: &str, user_b: &str) -> String {
    if user_a <= user_b {
        format!("{user_a}:{user_b}")
    } else {
        format!("{user_b}:{user_a}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gymhub_db::entities::user_block;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> ConversationService {
        let db = Arc::new(db);
        ConversationService::new(
            ConversationRepository::new(Arc::clone(&db)),
            BlockRepository::new(db),
        )
    }

    #[test]
    fn test_direct_key_is_symmetric() {
        assert_eq!(direct_key("bob", "alice"), direct_key("alice", "bob"));
        assert_eq!(direct_key("alice", "bob"), "alice:bob");
    }

    #[tokio::test]
    async fn test_returns_existing_conversation() {
        let existing = conversation::Model {
            id: "cv1".to_string(),
            direct_key: "alice:bob".to_string(),
            created_at: Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_block::Model>::new()])
            .append_query_results([[existing.clone()]])
            .into_connection();

        let direct = service(db).get_or_create_direct("bob", "alice").await.unwrap();

        assert!(!direct.created);
        assert_eq!(direct.conversation, existing);
    }

    #[tokio::test]
    async fn test_creates_conversation_with_both_participants() {
        let created = conversation::Model {
            id: "cv2".to_string(),
            direct_key: "alice:bob".to_string(),
            created_at: Utc::now().into(),
        };
        let participant = |user: &str| conversation_participant::Model {
            id: format!("p-{user}"),
            conversation_id: "cv2".to_string(),
            user_id: user.to_string(),
            joined_at: Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_block::Model>::new()])
            .append_query_results([Vec::<conversation::Model>::new()])
            .append_query_results([[created.clone()]])
            .append_query_results([[participant("alice")]])
            .append_query_results([[participant("bob")]])
            .into_connection();

        let direct = service(db).get_or_create_direct("alice", "bob").await.unwrap();

        assert!(direct.created);
        assert_eq!(direct.conversation.direct_key, "alice:bob");
    }

    #[tokio::test]
    async fn test_blocked_pair_is_forbidden() {
        let block = user_block::Model {
            id: "b1".to_string(),
            blocker_id: "bob".to_string(),
            blocked_id: "alice".to_string(),
            reason: None,
            created_at: Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[block]])
            .into_connection();

        let result = service(db).get_or_create_direct("alice", "bob").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
