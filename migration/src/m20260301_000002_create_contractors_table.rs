use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `contractors` table and its columns.
#[derive(DeriveIden)]
enum Contractors {
    Table,
    Id,
    Name,
    TaxId,
    Phone,
    SpecialtyId,
    CreatedAt,
    UpdatedAt,
}

/// Re-declare parent table identifiers for foreign-key references.
#[derive(DeriveIden)]
enum Specialties {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contractors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contractors::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contractors::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Contractors::TaxId).string_len(13).not_null())
                    .col(ColumnDef::new(Contractors::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(Contractors::SpecialtyId).uuid().null())
                    .col(
                        ColumnDef::new(Contractors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contractors::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contractors_specialty_id")
                            .from(Contractors::Table, Contractors::SpecialtyId)
                            .to(Specialties::Table, Specialties::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Contractors::Table).to_owned())
            .await
    }
}
