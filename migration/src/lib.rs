pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_specialties_table;
mod m20260301_000002_create_contractors_table;
mod m20260301_000003_create_projects_table;
mod m20260301_000004_create_contractor_projects_table;
mod m20260301_000005_create_concepts_table;
mod m20260301_000006_create_payments_table;
mod m20260302_000001_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_specialties_table::Migration),
            Box::new(m20260301_000002_create_contractors_table::Migration),
            Box::new(m20260301_000003_create_projects_table::Migration),
            Box::new(m20260301_000004_create_contractor_projects_table::Migration),
            Box::new(m20260301_000005_create_concepts_table::Migration),
            Box::new(m20260301_000006_create_payments_table::Migration),
            Box::new(m20260302_000001_add_indexes::Migration),
        ]
    }
}
