//! Create rescue table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rescue::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rescue::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Rescue::Description).text().not_null())
                    .col(ColumnDef::new(Rescue::AuthorName).string_len(256).not_null())
                    .col(ColumnDef::new(Rescue::City).string_len(128).not_null())
                    .col(ColumnDef::new(Rescue::Cep).string_len(16))
                    .col(ColumnDef::new(Rescue::Address).string_len(256))
                    .col(ColumnDef::new(Rescue::Number).string_len(16))
                    .col(ColumnDef::new(Rescue::ContactPhone).string_len(32))
                    .col(ColumnDef::new(Rescue::PhotoRef).string_len(1024))
                    .col(
                        ColumnDef::new(Rescue::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Rescue::ReporterId).string_len(32))
                    .col(ColumnDef::new(Rescue::AssignedOrgId).string_len(32))
                    .col(
                        ColumnDef::new(Rescue::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Rescue::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rescue_reporter")
                            .from(Rescue::Table, Rescue::ReporterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rescue_assigned_org")
                            .from(Rescue::Table, Rescue::AssignedOrgId)
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
                    .name("idx_rescue_city_status")
                    .table(Rescue::Table)
                    .col(Rescue::City)
                    .col(Rescue::Status)
                    .to_owned(),
            )
            .await?;

        // Index: reporter (owner listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_rescue_reporter_id")
                    .table(Rescue::Table)
                    .col(Rescue::ReporterId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rescue::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Rescue {
    Table,
    Id,
    Description,
    AuthorName,
    City,
    Cep,
    Address,
    Number,
    ContactPhone,
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
