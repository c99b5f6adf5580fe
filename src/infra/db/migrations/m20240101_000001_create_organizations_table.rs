//! Migration: Create organizations table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organizations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Organizations::Name).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Organizations::Code)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Organizations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Organizations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Organizations::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique among live rows only, so a soft-deleted row does not block reuse
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX idx_organizations_code ON organizations (code) WHERE deleted_at IS NULL",
            )
            .await?;

        // Soft-delete filter runs on every read
        manager
            .create_index(
                Index::create()
                    .name("idx_organizations_deleted_at")
                    .table(Organizations::Table)
                    .col(Organizations::DeletedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Organizations {
    Table,
    Id,
    Name,
    Code,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
