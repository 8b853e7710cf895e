//! Gym entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A published gym. Visibility (`is_hidden`) is independent of existence.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gym")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    pub country: String,

    pub city: String,

    #[sea_orm(nullable)]
    pub address: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(nullable)]
    pub website: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_hidden: bool,

    /// JSON array of facility names.
    #[sea_orm(column_type = "JsonBinary")]
    pub facilities: Json,

    /// JSON array of difficulty level labels.
    #[sea_orm(column_type = "JsonBinary")]
    pub difficulty_levels: Json,

    /// JSON object keyed by weekday.
    #[sea_orm(column_type = "JsonBinary")]
    pub opening_hours: Json,

    /// Requesting user when the gym came from an approved request.
    #[sea_orm(nullable)]
    pub created_by: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
