use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Pivot table linking contractors to the projects they are assigned to.
#[derive(DeriveIden)]
enum ContractorProjects {
    Table,
    ContractorId,
    ProjectId,
    AssignedAt,
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
                    .table(ContractorProjects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContractorProjects::ContractorId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractorProjects::ProjectId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContractorProjects::AssignedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_contractor_projects")
                            .col(ContractorProjects::ContractorId)
                            .col(ContractorProjects::ProjectId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contractor_projects_contractor_id")
                            .from(ContractorProjects::Table, ContractorProjects::ContractorId)
                            .to(Contractors::Table, Contractors::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contractor_projects_project_id")
                            .from(ContractorProjects::Table, ContractorProjects::ProjectId)
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
            .drop_table(Table::drop().table(ContractorProjects::Table).to_owned())
            .await
    }
}
