//! User mute entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One user hiding another user's content. Not visible to the muted party.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_mute")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user doing the muting.
    #[sea_orm(indexed)]
    pub muter_id: String,

    /// The user being muted.
    pub muted_id: String,

    /// None = permanent.
    #[sea_orm(nullable)]
    pub expires_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
