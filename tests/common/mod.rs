#![allow(dead_code)]

use chrono::{DateTime, Utc};
use migration::{Migrator, MigratorTrait};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use uuid::Uuid;

use contractor_backend::db::{assignments, contractors as contractor_db, projects as project_db};
use contractor_backend::models::concepts::CreateConcept;
use contractor_backend::models::contractors::{self, ContractorForm};
use contractor_backend::models::payments;
use contractor_backend::models::projects::{self, CreateProject, ProjectStatus};

/// Fresh in-memory SQLite database with the schema applied.
///
/// A single pooled connection keeps every query on the same in-memory
/// database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open SQLite database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");
    db
}

pub fn form(name: &str) -> ContractorForm {
    ContractorForm {
        name: name.to_string(),
        tax_id: "ACM010101AB1".to_string(),
        phone: "5550001111".to_string(),
        specialty_id: None,
        project_ids: None,
        documents: Vec::new(),
    }
}

pub async fn seed_contractor(db: &DatabaseConnection, name: &str) -> contractors::Model {
    contractor_db::insert_contractor(db, &form(name), Utc::now())
        .await
        .expect("Failed to insert contractor")
}

pub async fn seed_project(db: &DatabaseConnection, name: &str) -> projects::Model {
    project_db::insert_project(
        db,
        CreateProject {
            name: name.to_string(),
            status: Some(ProjectStatus::Active),
        },
    )
    .await
    .expect("Failed to insert project")
}

pub async fn assign(db: &DatabaseConnection, contractor: Uuid, project: Uuid) {
    assignments::assign(db, contractor, project)
        .await
        .expect("Failed to assign contractor");
}

pub fn concept_input(name: &str, total: i64, advance: Option<i64>) -> CreateConcept {
    CreateConcept {
        name: name.to_string(),
        description: None,
        total_amount: Some(Decimal::from(total)),
        advance: advance.map(Decimal::from),
    }
}

/// Record a regular (non-advance) payment against a concept.
pub async fn seed_payment(
    db: &DatabaseConnection,
    concept_id: Uuid,
    amount: i64,
    paid_at: DateTime<Utc>,
) -> payments::Model {
    payments::ActiveModel {
        id: Set(Uuid::new_v4()),
        concept_id: Set(concept_id),
        project_id: Set(None),
        amount: Set(Decimal::from(amount)),
        paid_at: Set(paid_at),
        description: Set(Some("Estimate".to_string())),
        is_advance: Set(false),
        created_at: Set(paid_at),
    }
    .insert(db)
    .await
    .expect("Failed to insert payment")
}
