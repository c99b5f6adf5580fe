//! Migration: Create segments and the user membership join table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_organizations_table::Organizations;
use super::m20240101_000003_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Code uniqueness is checked by the repository, not the schema
        manager
            .create_table(
                Table::create()
                    .table(Segments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Segments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Segments::OrganizationId).integer().not_null())
                    .col(ColumnDef::new(Segments::Code).string_len(32).not_null())
                    .col(ColumnDef::new(Segments::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Segments::Description).text().null())
                    .col(
                        ColumnDef::new(Segments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Segments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Segments::DeletedAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_segments_organization")
                            .from(Segments::Table, Segments::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_segments_organization")
                    .table(Segments::Table)
                    .col(Segments::OrganizationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserSegments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserSegments::SegmentId).integer().not_null())
                    .col(ColumnDef::new(UserSegments::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserSegments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(UserSegments::SegmentId)
                            .col(UserSegments::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_segments_segment")
                            .from(UserSegments::Table, UserSegments::SegmentId)
                            .to(Segments::Table, Segments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_segments_user")
                            .from(UserSegments::Table, UserSegments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserSegments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Segments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Segments {
    Table,
    Id,
    OrganizationId,
    Code,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum UserSegments {
    Table,
    SegmentId,
    UserId,
    CreatedAt,
}
