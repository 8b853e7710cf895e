//! Create content report table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContentReport::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContentReport::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ContentReport::SubjectKind)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContentReport::SubjectId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContentReport::ReportedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContentReport::Reason).string_len(256).not_null())
                    .col(ColumnDef::new(ContentReport::Details).text())
                    .col(
                        ColumnDef::new(ContentReport::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(ContentReport::ReviewedBy).string_len(32))
                    .col(ColumnDef::new(ContentReport::ReviewedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ContentReport::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (subject_kind, subject_id) for closing sibling reports
        manager
            .create_index(
                Index::create()
                    .name("idx_content_report_subject")
                    .table(ContentReport::Table)
                    .col(ContentReport::SubjectKind)
                    .col(ContentReport::SubjectId)
                    .to_owned(),
            )
            .await?;

        // Index: status (moderation queue)
        manager
            .create_index(
                Index::create()
                    .name("idx_content_report_status")
                    .table(ContentReport::Table)
                    .col(ContentReport::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContentReport::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ContentReport {
    Table,
    Id,
    SubjectKind,
    SubjectId,
    ReportedBy,
    Reason,
    Details,
    Status,
    ReviewedBy,
    ReviewedAt,
    CreatedAt,
}
