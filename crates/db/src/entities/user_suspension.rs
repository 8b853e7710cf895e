//! User suspension entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User suspension model - an append-only record of time-boxed or
/// permanent access restrictions. The current suspension is the latest
/// row with `is_active = true`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "user_suspension")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// The suspended user.
    #[sea_orm(indexed)]
    pub user_id: String,
    /// Reason shown to the user.
    pub reason: String,
    /// Internal moderator notes.
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    /// The admin who created the suspension.
    pub suspended_by: String,
    /// When the suspension expires (None = permanent).
    pub expires_at: Option<DateTimeWithTimeZone>,
    /// Whether the suspension is in force.
    pub is_active: bool,
    /// When the suspension was created.
    pub created_at: DateTimeWithTimeZone,
    /// When the suspension was lifted or expired.
    pub lifted_at: Option<DateTimeWithTimeZone>,
    /// Admin who lifted the suspension (None when it expired).
    pub lifted_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
