//! Create report table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Report::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Report::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Report::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Report::Description).text().not_null())
                    .col(ColumnDef::new(Report::City).string_len(128).not_null())
                    .col(ColumnDef::new(Report::Address).string_len(256))
                    .col(ColumnDef::new(Report::SightedAt).date().not_null())
                    .col(ColumnDef::new(Report::ContactPhone).string_len(32).not_null())
                    .col(ColumnDef::new(Report::ContactEmail).string_len(256))
                    .col(ColumnDef::new(Report::PhotoRef).string_len(1024))
                    .col(
                        ColumnDef::new(Report::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Report::ReporterId).string_len(32))
                    .col(ColumnDef::new(Report::AssignedOrgId).string_len(32))
                    .col(
                        ColumnDef::new(Report::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Report::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_reporter")
                            .from(Report::Table, Report::ReporterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_assigned_org")
                            .from(Report::Table, Report::AssignedOrgId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (city, status) - the organization queue query
        manager
            .create_index(
                Index::create()
                    .name("idx_report_city_status")
                    .table(Report::Table)
                    .col(Report::City)
                    .col(Report::Status)
                    .to_owned(),
            )
            .await?;

        // Index: reporter (owner listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_reporter_id")
                    .table(Report::Table)
                    .col(Report::ReporterId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Report::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Report {
    Table,
    Id,
    Title,
    Description,
    City,
    Address,
    SightedAt,
    ContactPhone,
    ContactEmail,
    PhotoRef,
    Status,
    ReporterId,
    AssignedOrgId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Organization {
    Table,
    Id,
}
