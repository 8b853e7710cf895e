//! Gym request entity.

use gymhub_common::{AppError, AppResult};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review status of a gym request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum GymRequestStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl GymRequestStatus {
    /// Lowercase name as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// State reached by applying `action`, or `InvalidTransition`.
    ///
    /// `pending` moves to `approved` or `rejected`, `rejected` can be
    /// restored to `pending`, and `approved` is terminal.
    pub fn transition(self, action: GymRequestAction) -> AppResult<Self> {
        match (self, action) {
            (Self::Pending, GymRequestAction::Approve) => Ok(Self::Approved),
            (Self::Pending, GymRequestAction::Reject) => Ok(Self::Rejected),
            (Self::Rejected, GymRequestAction::Restore) => Ok(Self::Pending),
            (from, action) => Err(AppError::InvalidTransition(format!(
                "cannot {} a gym request that is {}",
                action.as_str(),
                from.as_str()
            ))),
        }
    }
}

/// Review actions on a gym request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GymRequestAction {
    Approve,
    Reject,
    Restore,
}

impl GymRequestAction {
    /// Verb as recorded in the request history.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Restore => "restore",
        }
    }
}

/// A user-submitted proposal for a new gym.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gym_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub gym_name: String,

    pub country: String,

    pub city: String,

    #[sea_orm(nullable)]
    pub address: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(nullable)]
    pub website: Option<String>,

    #[sea_orm(column_type = "JsonBinary")]
    pub facilities: Json,

    #[sea_orm(column_type = "JsonBinary")]
    pub difficulty_levels: Json,

    #[sea_orm(column_type = "JsonBinary")]
    pub opening_hours: Json,

    #[sea_orm(indexed)]
    pub requested_by: String,

    #[sea_orm(indexed)]
    pub status: GymRequestStatus,

    #[sea_orm(nullable)]
    pub reviewed_by: Option<String>,

    #[sea_orm(nullable)]
    pub reviewed_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(column_type = "Text", nullable)]
    pub admin_notes: Option<String>,

    /// Gym created when this request was approved.
    #[sea_orm(nullable)]
    pub approved_gym_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIONS: [GymRequestAction; 3] = [
        GymRequestAction::Approve,
        GymRequestAction::Reject,
        GymRequestAction::Restore,
    ];

    #[test]
    fn test_pending_transitions() {
        let pending = GymRequestStatus::Pending;
        assert_eq!(
            pending.transition(GymRequestAction::Approve).ok(),
            Some(GymRequestStatus::Approved)
        );
        assert_eq!(
            pending.transition(GymRequestAction::Reject).ok(),
            Some(GymRequestStatus::Rejected)
        );
        assert!(pending.transition(GymRequestAction::Restore).is_err());
    }

    #[test]
    fn test_rejected_only_restores() {
        let rejected = GymRequestStatus::Rejected;
        assert_eq!(
            rejected.transition(GymRequestAction::Restore).ok(),
            Some(GymRequestStatus::Pending)
        );
        assert!(rejected.transition(GymRequestAction::Reject).is_err());
        assert!(rejected.transition(GymRequestAction::Approve).is_err());
    }

    #[test]
    fn test_approved_is_terminal() {
        for action in ACTIONS {
            assert!(matches!(
                GymRequestStatus::Approved.transition(action),
                Err(AppError::InvalidTransition(_))
            ));
        }
    }
}
