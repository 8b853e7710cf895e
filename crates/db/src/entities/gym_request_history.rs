//! Gym request history entity (append-only audit trail).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gym_request_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub gym_request_id: String,

    /// Action name, e.g. "approved", "rejected", "restored", "updated".
    pub action: String,

    pub changed_by: String,

    /// `{field: {old, new}}`
    #[sea_orm(column_type = "JsonBinary")]
    pub changes: Json,

    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
