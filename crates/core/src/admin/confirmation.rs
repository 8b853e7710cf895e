//! Confirmation gate for admin commands.
//!
//! Each admin has at most one pending confirmation. Opening a new one
//! replaces the old slot; confirming removes the slot before the command
//! runs, so a double submit finds nothing to execute.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use gymhub_common::{AppError, AppResult, IdGenerator};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use super::command::{AdminCommand, ConfirmationPrompt};
use super::dispatcher::{CommandDispatcher, CommandOutcome};

struct PendingConfirmation {
    token: String,
    command: AdminCommand,
    opened_at: DateTime<Utc>,
}

/// A freshly opened confirmation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedConfirmation {
    pub token: String,
    pub action: &'static str,
    pub prompt: ConfirmationPrompt,
    pub expires_at: DateTime<Utc>,
    /// The command this one displaced, if a confirmation was already open.
    #[serde(skip)]
    pub replaced: Option<AdminCommand>,
}

/// Longest a confirmation may stay open.
const MAX_TTL_SECS: i64 = 7 * 86_400;

/// Per-admin pending confirmation slots.
#[derive(Clone)]
pub struct ConfirmationGate {
    dispatcher: CommandDispatcher,
    slots: Arc<Mutex<HashMap<String, PendingConfirmation>>>,
    ttl: Duration,
    id_gen: IdGenerator,
}

impl ConfirmationGate {
    /// Create a gate whose slots expire after `ttl_secs`.
    #[must_use]
    pub fn new(dispatcher: CommandDispatcher, ttl_secs: i64) -> Self {
        Self {
            dispatcher,
            slots: Arc::new(Mutex::new(HashMap::new())),
            ttl: Duration::seconds(ttl_secs.clamp(0, MAX_TTL_SECS)),
            id_gen: IdGenerator::new(),
        }
    }

    /// Dispatcher behind the gate.
    #[must_use]
    pub const fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    /// Open a confirmation for `command`, replacing any pending one.
    pub async fn open(&self, admin_id: &str, command: AdminCommand) -> OpenedConfirmation {
        let token = self.id_gen.generate_token();
        let opened_at = Utc::now();
        let prompt = command.prompt();
        let action = command.name();

        let previous = self.slots.lock().await.insert(
            admin_id.to_string(),
            PendingConfirmation {
                token: token.clone(),
                command,
                opened_at,
            },
        );

        let replaced = previous
            .filter(|p| !self.is_expired(p, opened_at))
            .map(|p| p.command);
        if let Some(old) = &replaced {
            debug!(admin_id, replaced = old.name(), action, "Pending confirmation replaced");
        }

        OpenedConfirmation {
            token,
            action,
            prompt,
            expires_at: opened_at + self.ttl,
            replaced,
        }
    }

    /// Remove and return the pending command matching `token`.
    ///
    /// A missing or expired slot is `NotFound`. A token from a slot that
    /// has since been replaced is `Conflict` and leaves the newer slot
    /// in place.
    pub async fn take(&self, admin_id: &str, token: &str) -> AppResult<AdminCommand> {
        let mut slots = self.slots.lock().await;

        let Some(pending) = slots.get(admin_id) else {
            return Err(AppError::NotFound("No pending confirmation".to_string()));
        };

        if self.is_expired(pending, Utc::now()) {
            slots.remove(admin_id);
            return Err(AppError::NotFound("Confirmation expired".to_string()));
        }

        if pending.token != token {
            return Err(AppError::Conflict(
                "Confirmation was replaced by a newer action".to_string(),
            ));
        }

        slots
            .remove(admin_id)
            .map(|p| p.command)
            .ok_or_else(|| AppError::NotFound("No pending confirmation".to_string()))
    }

    /// Confirm and run the pending command.
    pub async fn confirm(&self, admin_id: &str, token: &str) -> AppResult<CommandOutcome> {
        let command = self.take(admin_id, token).await?;
        self.dispatcher.dispatch(admin_id, command).await
    }

    /// Drop the pending confirmation, if any. Returns whether one was open.
    pub async fn cancel(&self, admin_id: &str) -> bool {
        self.slots.lock().await.remove(admin_id).is_some()
    }

    /// Prompt of the live pending confirmation, if any.
    pub async fn pending(&self, admin_id: &str) -> Option<ConfirmationPrompt> {
        let slots = self.slots.lock().await;
        slots
            .get(admin_id)
            .filter(|p| !self.is_expired(p, Utc::now()))
            .map(|p| p.command.prompt())
    }

    fn is_expired(&self, pending: &PendingConfirmation, now: DateTime<Utc>) -> bool {
        now >= pending.opened_at + self.ttl
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gymhub_db::entities::profile;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

    fn gate(db: DatabaseConnection, ttl_secs: i64) -> ConfirmationGate {
        ConfirmationGate::new(CommandDispatcher::from_db(&Arc::new(db)), ttl_secs)
    }

    fn ban(user_id: &str) -> AdminCommand {
        AdminCommand::BanUser {
            user_id: user_id.to_string(),
        }
    }

    fn empty_db() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres).into_connection()
    }

    #[tokio::test]
    async fn test_oversized_ttl_is_clamped() {
        let gate = gate(empty_db(), i64::MAX);

        let opened = gate.open("admin1", ban("u1")).await;

        assert!(opened.expires_at <= Utc::now() + Duration::seconds(MAX_TTL_SECS));
        assert!(gate.pending("admin1").await.is_some());
    }

    #[tokio::test]
    async fn test_confirm_runs_once() {
        let target = profile::Model {
            id: "u1".to_string(),
            full_name: "Target".to_string(),
            email: "u1@example.com".to_string(),
            token: None,
            is_admin: false,
            is_banned: false,
            created_at: Utc::now().into(),
            last_active_at: None,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[target]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let gate = gate(db, 600);

        let opened = gate.open("admin1", ban("u1")).await;
        assert!(opened.replaced.is_none());

        let outcome = gate.confirm("admin1", &opened.token).await.unwrap();
        assert_eq!(outcome.action, "ban_user");

        let second = gate.confirm("admin1", &opened.token).await;
        assert!(matches!(second, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reopen_replaces_and_stale_token_conflicts() {
        let gate = gate(empty_db(), 600);

        let first = gate.open("admin1", ban("u1")).await;
        let second = gate.open("admin1", ban("u2")).await;
        assert!(matches!(
            second.replaced,
            Some(AdminCommand::BanUser { ref user_id }) if user_id == "u1"
        ));

        let stale = gate.take("admin1", &first.token).await;
        assert!(matches!(stale, Err(AppError::Conflict(_))));

        let live = gate.take("admin1", &second.token).await.unwrap();
        assert!(matches!(live, AdminCommand::BanUser { ref user_id } if user_id == "u2"));
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let gate = gate(empty_db(), 600);
        let opened = gate.open("admin1", ban("u1")).await;

        assert!(gate.cancel("admin1").await);
        assert!(!gate.cancel("admin1").await);
        assert!(gate.pending("admin1").await.is_none());

        let result = gate.take("admin1", &opened.token).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_expired_slot_is_absent() {
        let gate = gate(empty_db(), 0);
        let opened = gate.open("admin1", ban("u1")).await;

        assert!(gate.pending("admin1").await.is_none());
        let result = gate.take("admin1", &opened.token).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_slots_are_per_admin() {
        let gate = gate(empty_db(), 600);
        let a = gate.open("admin1", ban("u1")).await;
        let b = gate.open("admin2", ban("u2")).await;

        assert!(b.replaced.is_none());
        assert!(gate.take("admin1", &a.token).await.is_ok());
        assert!(gate.pending("admin2").await.is_some());
    }
}
