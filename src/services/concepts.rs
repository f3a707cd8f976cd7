use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use super::contractors::{require_contractor, require_project};
use crate::db::{
    assignments as assignment_db, concepts as concept_db, payments as payment_db,
    projects as project_db,
};
use crate::error::AppError;
use crate::models::concepts::{self, ConceptDetails, CreateConcept};

/// Fail with `AssignmentViolation` unless the contractor works on the project.
pub async fn ensure_assigned<C: ConnectionTrait>(
    db: &C,
    contractor_id: Uuid,
    project_id: Uuid,
) -> Result<(), AppError> {
    if assignment_db::is_assigned(db, contractor_id, project_id).await? {
        Ok(())
    } else {
        Err(AppError::AssignmentViolation(
            "The contractor is not assigned to this project".into(),
        ))
    }
}

/// Attach payments (and optionally projects) to each concept.
async fn with_details<C: ConnectionTrait>(
    db: &C,
    concepts: Vec<concepts::Model>,
    include_project: bool,
) -> Result<Vec<ConceptDetails>, AppError> {
    let ids: Vec<Uuid> = concepts.iter().map(|c| c.id).collect();
    let mut payments = payment_db::get_payments_by_concepts(db, &ids).await?;

    let projects = if include_project {
        let mut project_ids: Vec<Uuid> = concepts.iter().map(|c| c.project_id).collect();
        project_ids.sort();
        project_ids.dedup();
        project_db::get_projects_by_ids(db, &project_ids).await?
    } else {
        Default::default()
    };

    Ok(concepts
        .into_iter()
        .map(|concept| ConceptDetails {
            project: projects.get(&concept.project_id).cloned(),
            payments: payments.remove(&concept.id).unwrap_or_default(),
            concept,
        })
        .collect())
}

/// Every concept of a contractor with its project and payments.
pub async fn list_concepts(
    db: &DatabaseConnection,
    contractor_id: Uuid,
) -> Result<Vec<ConceptDetails>, AppError> {
    require_contractor(db, contractor_id).await?;
    let concepts = concept_db::get_concepts_by_contractor(db, contractor_id).await?;
    with_details(db, concepts, true).await
}

/// The contractor's concepts on one project it is assigned to.
pub async fn list_project_concepts(
    db: &DatabaseConnection,
    contractor_id: Uuid,
    project_id: Uuid,
) -> Result<Vec<ConceptDetails>, AppError> {
    require_contractor(db, contractor_id).await?;
    require_project(db, project_id).await?;
    ensure_assigned(db, contractor_id, project_id).await?;

    let concepts =
        concept_db::get_concepts_by_contractor_and_project(db, contractor_id, project_id).await?;
    with_details(db, concepts, false).await
}

/// Create a concept and, for a positive `anticipo`, its advance payment.
/// Both rows are written in one transaction.
pub async fn create_concept(
    db: &DatabaseConnection,
    contractor_id: Uuid,
    project_id: Uuid,
    input: CreateConcept,
    now: DateTime<Utc>,
) -> Result<ConceptDetails, AppError> {
    require_contractor(db, contractor_id).await?;
    require_project(db, project_id).await?;
    ensure_assigned(db, contractor_id, project_id).await?;
    input.validate()?;

    let txn = db.begin().await.map_err(AppError::Transaction)?;

    let concept = concept_db::insert_concept(&txn, contractor_id, project_id, &input, now).await?;

    let mut payments = Vec::new();
    if let Some(advance) = input.positive_advance() {
        let description = format!("Anticipo para el concepto: {}", concept.name);
        let payment =
            payment_db::insert_advance_payment(&txn, concept.id, project_id, advance, description, now)
                .await
                .map_err(|e| {
                    tracing::error!(concept_id = %concept.id, "Failed to record advance payment: {e}");
                    AppError::Database(e)
                })?;
        payments.push(payment);
    }

    txn.commit().await.map_err(AppError::Transaction)?;

    tracing::info!(
        concept_id = %concept.id,
        %contractor_id,
        %project_id,
        advance = !payments.is_empty(),
        "Concept created"
    );

    Ok(ConceptDetails {
        concept,
        project: None,
        payments,
    })
}
