use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `concepts` table and its columns.
#[derive(DeriveIden)]
enum Concepts {
    Table,
    Id,
    ContractorId,
    ProjectId,
    Name,
    Description,
    TotalAmount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Contractors {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Concepts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Concepts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    // Nullable so the orphan delete policy can keep billing history.
                    .col(ColumnDef::new(Concepts::ContractorId).uuid().null())
                    .col(ColumnDef::new(Concepts::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Concepts::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Concepts::Description).text().null())
                    .col(
                        ColumnDef::new(Concepts::TotalAmount)
                            .decimal_len(14, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Concepts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_concepts_contractor_id")
                            .from(Concepts::Table, Concepts::ContractorId)
                            .to(Contractors::Table, Contractors::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_concepts_project_id")
                            .from(Concepts::Table, Concepts::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Concepts::Table).to_owned())
            .await
    }
}
