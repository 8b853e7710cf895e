//! Create gym, gym request and gym request history tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Gym::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Gym::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Gym::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Gym::Country).string_len(128).not_null())
                    .col(ColumnDef::new(Gym::City).string_len(128).not_null())
                    .col(ColumnDef::new(Gym::Address).string_len(512))
                    .col(ColumnDef::new(Gym::Description).text())
                    .col(ColumnDef::new(Gym::Website).string_len(512))
                    .col(
                        ColumnDef::new(Gym::IsHidden)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Gym::Facilities).json_binary().not_null())
                    .col(ColumnDef::new(Gym::DifficultyLevels).json_binary().not_null())
                    .col(ColumnDef::new(Gym::OpeningHours).json_binary().not_null())
                    .col(ColumnDef::new(Gym::CreatedBy).string_len(32))
                    .col(
                        ColumnDef::new(Gym::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (country, city) for the location filters
        manager
            .create_index(
                Index::create()
                    .name("idx_gym_country_city")
                    .table(Gym::Table)
                    .col(Gym::Country)
                    .col(Gym::City)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GymRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GymRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GymRequest::GymName).string_len(256).not_null())
                    .col(ColumnDef::new(GymRequest::Country).string_len(128).not_null())
                    .col(ColumnDef::new(GymRequest::City).string_len(128).not_null())
                    .col(ColumnDef::new(GymRequest::Address).string_len(512))
                    .col(ColumnDef::new(GymRequest::Description).text())
                    .col(ColumnDef::new(GymRequest::Website).string_len(512))
                    .col(ColumnDef::new(GymRequest::Facilities).json_binary().not_null())
                    .col(
                        ColumnDef::new(GymRequest::DifficultyLevels)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GymRequest::OpeningHours)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GymRequest::RequestedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GymRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(GymRequest::ReviewedBy).string_len(32))
                    .col(ColumnDef::new(GymRequest::ReviewedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(GymRequest::AdminNotes).text())
                    .col(ColumnDef::new(GymRequest::ApprovedGymId).string_len(32))
                    .col(
                        ColumnDef::new(GymRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_gym_request_status")
                    .table(GymRequest::Table)
                    .col(GymRequest::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GymRequestHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GymRequestHistory::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GymRequestHistory::GymRequestId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GymRequestHistory::Action)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GymRequestHistory::ChangedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GymRequestHistory::Changes)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GymRequestHistory::Notes).text())
                    .col(
                        ColumnDef::new(GymRequestHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gym_request_history_request")
                            .from(GymRequestHistory::Table, GymRequestHistory::GymRequestId)
                            .to(GymRequest::Table, GymRequest::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_gym_request_history_request")
                    .table(GymRequestHistory::Table)
                    .col(GymRequestHistory::GymRequestId)
                    .col(GymRequestHistory::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GymRequestHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GymRequest::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Gym::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Gym {
    Table,
    Id,
    Name,
    Country,
    City,
    Address,
    Description,
    Website,
    IsHidden,
    Facilities,
    DifficultyLevels,
    OpeningHours,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum GymRequest {
    Table,
    Id,
    GymName,
    Country,
    City,
    Address,
    Description,
    Website,
    Facilities,
    DifficultyLevels,
    OpeningHours,
    RequestedBy,
    Status,
    ReviewedBy,
    ReviewedAt,
    AdminNotes,
    ApprovedGymId,
    CreatedAt,
}

#[derive(Iden)]
enum GymRequestHistory {
    Table,
    Id,
    GymRequestId,
    Action,
    ChangedBy,
    Changes,
    Notes,
    CreatedAt,
}
