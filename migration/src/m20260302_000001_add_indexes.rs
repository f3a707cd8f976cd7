use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Concepts {
    Table,
    ContractorId,
    ProjectId,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    ConceptId,
    PaidAt,
}

#[derive(DeriveIden)]
enum ContractorProjects {
    Table,
    ProjectId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Dashboard loads all concepts of one contractor
        manager
            .create_index(
                Index::create()
                    .name("idx_concepts_contractor_id")
                    .table(Concepts::Table)
                    .col(Concepts::ContractorId)
                    .to_owned(),
            )
            .await?;

        // Per-project concept listing
        manager
            .create_index(
                Index::create()
                    .name("idx_concepts_project_id")
                    .table(Concepts::Table)
                    .col(Concepts::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_concept_id")
                    .table(Payments::Table)
                    .col(Payments::ConceptId)
                    .to_owned(),
            )
            .await?;

        // Monthly payment windows
        manager
            .create_index(
                Index::create()
                    .name("idx_payments_paid_at")
                    .table(Payments::Table)
                    .col(Payments::PaidAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contractor_projects_project_id")
                    .table(ContractorProjects::Table)
                    .col(ContractorProjects::ProjectId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_concepts_contractor_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_concepts_project_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_payments_concept_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_payments_paid_at").to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_contractor_projects_project_id")
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
