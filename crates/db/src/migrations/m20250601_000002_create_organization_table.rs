//! Create organization table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organization::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organization::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Organization::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Organization::Email).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Organization::PasswordHash)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Organization::Phone).string_len(32).not_null())
                    .col(ColumnDef::new(Organization::Cpf).string_len(16))
                    .col(ColumnDef::new(Organization::Cep).string_len(16))
                    .col(ColumnDef::new(Organization::City).string_len(128).not_null())
                    .col(ColumnDef::new(Organization::District).string_len(128))
                    .col(ColumnDef::new(Organization::Address).string_len(256))
                    .col(ColumnDef::new(Organization::Number).string_len(16))
                    .col(ColumnDef::new(Organization::Description).text())
                    .col(ColumnDef::new(Organization::PhotoRef).string_len(1024))
                    .col(
                        ColumnDef::new(Organization::ReportsResolved)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Organization::RescuesResolved)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Organization::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Organization::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique index: email (organizations are their own namespace)
        manager
            .create_index(
                Index::create()
                    .name("idx_organization_email")
                    .table(Organization::Table)
                    .col(Organization::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: city (directory filter and workflow guard lookups)
        manager
            .create_index(
                Index::create()
                    .name("idx_organization_city")
                    .table(Organization::Table)
                    .col(Organization::City)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Organization::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Organization {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Phone,
    Cpf,
    Cep,
    City,
    District,
    Address,
    Number,
    Description,
    PhotoRef,
    ReportsResolved,
    RescuesResolved,
    CreatedAt,
    UpdatedAt,
}
