//! Community entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A community. `is_active = false` means suspended, not deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "community")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub rules: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_private: bool,

    #[sea_orm(default_value = true)]
    pub is_active: bool,

    /// Gym this community belongs to, if any.
    #[sea_orm(indexed, nullable)]
    pub gym_id: Option<String>,

    /// Free-form type tag (e.g. "gym", "general", "training").
    pub community_type: String,

    pub created_by: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
