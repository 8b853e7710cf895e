//! Create suspension, mute and block tables.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_profile_table::Profile;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserSuspension::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserSuspension::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserSuspension::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(UserSuspension::Reason).string_len(512).not_null())
                    .col(ColumnDef::new(UserSuspension::Notes).text())
                    .col(
                        ColumnDef::new(UserSuspension::SuspendedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserSuspension::ExpiresAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(UserSuspension::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(UserSuspension::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(UserSuspension::LiftedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(UserSuspension::LiftedBy).string_len(32))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_suspension_user")
                            .from(UserSuspension::Table, UserSuspension::UserId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, is_active) for current-suspension lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_user_suspension_user_active")
                    .table(UserSuspension::Table)
                    .col(UserSuspension::UserId)
                    .col(UserSuspension::IsActive)
                    .to_owned(),
            )
            .await?;

        // Index: expires_at (for the expiry sweep)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_suspension_expires_at")
                    .table(UserSuspension::Table)
                    .col(UserSuspension::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserMute::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserMute::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserMute::MuterId).string_len(32).not_null())
                    .col(ColumnDef::new(UserMute::MutedId).string_len(32).not_null())
                    .col(ColumnDef::new(UserMute::ExpiresAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(UserMute::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_mute_muter")
                            .from(UserMute::Table, UserMute::MuterId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_mute_muted")
                            .from(UserMute::Table, UserMute::MutedId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (muter_id, muted_id) - prevent duplicate mutes
        manager
            .create_index(
                Index::create()
                    .name("idx_user_mute_pair")
                    .table(UserMute::Table)
                    .col(UserMute::MuterId)
                    .col(UserMute::MutedId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserBlock::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserBlock::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserBlock::BlockerId).string_len(32).not_null())
                    .col(ColumnDef::new(UserBlock::BlockedId).string_len(32).not_null())
                    .col(ColumnDef::new(UserBlock::Reason).text())
                    .col(
                        ColumnDef::new(UserBlock::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_block_blocker")
                            .from(UserBlock::Table, UserBlock::BlockerId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_block_blocked")
                            .from(UserBlock::Table, UserBlock::BlockedId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (blocker_id, blocked_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_block_pair")
                    .table(UserBlock::Table)
                    .col(UserBlock::BlockerId)
                    .col(UserBlock::BlockedId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserBlock::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserMute::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserSuspension::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserSuspension {
    Table,
    Id,
    UserId,
    Reason,
    Notes,
    SuspendedBy,
    ExpiresAt,
    IsActive,
    CreatedAt,
    LiftedAt,
    LiftedBy,
}

#[derive(Iden)]
enum UserMute {
    Table,
    Id,
    MuterId,
    MutedId,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
enum UserBlock {
    Table,
    Id,
    BlockerId,
    BlockedId,
    Reason,
    CreatedAt,
}
