use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use crate::config::ContractorDeletePolicy;
use crate::db::{
    assignments as assignment_db, concepts as concept_db, contractors as contractor_db,
    projects as project_db, specialties as specialty_db,
};
use crate::error::AppError;
use crate::models::contractors::{self, ContractorForm, ContractorResponse};
use crate::models::projects;
use crate::storage::{DocumentStore, StoredDocument, UploadedDocument};

/// Load a contractor or fail with `NotFound`.
pub async fn require_contractor<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<contractors::Model, AppError> {
    contractor_db::get_contractor_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Contractor", id))
}

/// Load a project or fail with `NotFound`.
pub async fn require_project<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<projects::Model, AppError> {
    project_db::get_project_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Project", id))
}

/// Attach specialty and projects to each contractor.
async fn hydrate<C: ConnectionTrait>(
    db: &C,
    contractors: Vec<contractors::Model>,
) -> Result<Vec<ContractorResponse>, AppError> {
    let ids: Vec<Uuid> = contractors.iter().map(|c| c.id).collect();
    let mut specialty_ids: Vec<Uuid> = contractors.iter().filter_map(|c| c.specialty_id).collect();
    specialty_ids.sort();
    specialty_ids.dedup();

    let mut projects = assignment_db::get_projects_for_contractors(db, &ids).await?;
    let specialties = specialty_db::get_specialties_by_ids(db, &specialty_ids).await?;

    Ok(contractors
        .into_iter()
        .map(|contractor| ContractorResponse {
            specialty: contractor
                .specialty_id
                .and_then(|id| specialties.get(&id).cloned()),
            projects: projects.remove(&contractor.id).unwrap_or_default(),
            documents: None,
            contractor,
        })
        .collect())
}

async fn hydrate_one<C: ConnectionTrait>(
    db: &C,
    contractor: contractors::Model,
) -> Result<ContractorResponse, AppError> {
    let id = contractor.id;
    hydrate(db, vec![contractor])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Contractor", id))
}

/// Reject forms pointing at a specialty or projects that do not exist.
async fn validate_references<C: ConnectionTrait>(
    db: &C,
    form: &ContractorForm,
) -> Result<(), AppError> {
    if let Some(specialty_id) = form.specialty_id {
        if specialty_db::get_specialty_by_id(db, specialty_id)
            .await?
            .is_none()
        {
            return Err(AppError::Validation(format!(
                "The selected especialidad_id {specialty_id} is invalid"
            )));
        }
    }

    if let Some(project_ids) = &form.project_ids {
        let missing = project_db::find_missing_project_ids(db, project_ids).await?;
        if !missing.is_empty() {
            let missing: Vec<String> = missing.iter().map(Uuid::to_string).collect();
            return Err(AppError::Validation(format!(
                "The selected proyectos are invalid: {}",
                missing.join(", ")
            )));
        }
    }

    Ok(())
}

/// Store a batch of uploads. On failure the files already written by this
/// batch are removed again.
async fn store_documents(
    store: &DocumentStore,
    contractor_id: Uuid,
    documents: &[UploadedDocument],
) -> Result<Vec<StoredDocument>, AppError> {
    let mut stored = Vec::with_capacity(documents.len());
    for document in documents {
        match store.store(contractor_id, document).await {
            Ok(doc) => stored.push(doc),
            Err(e) => {
                discard_documents(store, contractor_id, &stored).await;
                return Err(e);
            }
        }
    }
    Ok(stored)
}

async fn discard_documents(store: &DocumentStore, contractor_id: Uuid, stored: &[StoredDocument]) {
    for doc in stored {
        if let Err(e) = store.delete(contractor_id, &doc.id).await {
            tracing::warn!(%contractor_id, document = %doc.id, "Failed to remove stored document: {e}");
        }
    }
}

/// All contractors with their specialty and projects.
pub async fn list_contractors(
    db: &DatabaseConnection,
) -> Result<Vec<ContractorResponse>, AppError> {
    let contractors = contractor_db::get_all_contractors(db).await?;
    hydrate(db, contractors).await
}

/// One contractor with specialty, projects and stored documents.
pub async fn get_contractor(
    db: &DatabaseConnection,
    store: &DocumentStore,
    id: Uuid,
) -> Result<ContractorResponse, AppError> {
    let contractor = require_contractor(db, id).await?;
    let mut response = hydrate_one(db, contractor).await?;
    response.documents = Some(store.list(id).await?);
    Ok(response)
}

/// Create a contractor, link its projects and store its documents as one unit.
pub async fn create_contractor(
    db: &DatabaseConnection,
    store: &DocumentStore,
    form: ContractorForm,
    now: DateTime<Utc>,
) -> Result<ContractorResponse, AppError> {
    validate_references(db, &form).await?;

    let txn = db.begin().await.map_err(AppError::Transaction)?;

    let contractor = contractor_db::insert_contractor(&txn, &form, now).await?;
    if let Some(project_ids) = &form.project_ids {
        assignment_db::sync_projects(&txn, contractor.id, project_ids).await?;
    }

    // Dropping `txn` on the error path rolls back the insert.
    let stored = store_documents(store, contractor.id, &form.documents).await?;

    if let Err(e) = txn.commit().await {
        discard_documents(store, contractor.id, &stored).await;
        return Err(AppError::Transaction(e));
    }

    tracing::info!(contractor_id = %contractor.id, documents = stored.len(), "Contractor created");
    hydrate_one(db, contractor).await
}

/// Update a contractor. `proyectos`, when sent, replaces the project links;
/// uploaded documents are added to the existing ones.
pub async fn update_contractor(
    db: &DatabaseConnection,
    store: &DocumentStore,
    id: Uuid,
    form: ContractorForm,
    now: DateTime<Utc>,
) -> Result<ContractorResponse, AppError> {
    let existing = require_contractor(db, id).await?;
    validate_references(db, &form).await?;

    let txn = db.begin().await.map_err(AppError::Transaction)?;

    let contractor = contractor_db::update_contractor(&txn, existing, &form, now).await?;
    if let Some(project_ids) = &form.project_ids {
        assignment_db::sync_projects(&txn, id, project_ids).await?;
    }

    let stored = store_documents(store, id, &form.documents).await?;

    if let Err(e) = txn.commit().await {
        discard_documents(store, id, &stored).await;
        return Err(AppError::Transaction(e));
    }

    tracing::info!(contractor_id = %id, documents = stored.len(), "Contractor updated");
    hydrate_one(db, contractor).await
}

/// Delete a contractor under the configured policy for its concepts.
///
/// Project links always go. Stored documents are removed once the database
/// work has committed; a failure there only leaves files behind.
pub async fn delete_contractor(
    db: &DatabaseConnection,
    store: &DocumentStore,
    id: Uuid,
    policy: ContractorDeletePolicy,
) -> Result<(), AppError> {
    let txn = db.begin().await.map_err(AppError::Transaction)?;

    require_contractor(&txn, id).await?;

    let affected = match policy {
        ContractorDeletePolicy::Restrict => {
            let count = concept_db::count_concepts_by_contractor(&txn, id).await?;
            if count > 0 {
                return Err(AppError::Conflict(format!(
                    "Contractor {id} still has {count} concepts"
                )));
            }
            0
        }
        ContractorDeletePolicy::Orphan => concept_db::orphan_concepts_of_contractor(&txn, id).await?,
        ContractorDeletePolicy::Cascade => concept_db::delete_concepts_of_contractor(&txn, id).await?,
    };

    assignment_db::detach_all(&txn, id).await?;
    contractor_db::delete_contractor(&txn, id).await?;
    txn.commit().await.map_err(AppError::Transaction)?;

    tracing::info!(contractor_id = %id, policy = policy.as_str(), concepts = affected, "Contractor deleted");

    if let Err(e) = store.delete_all(id).await {
        tracing::warn!(contractor_id = %id, "Failed to remove contractor documents: {e}");
    }
    Ok(())
}

/// Link a contractor to a project. Linking twice is a no-op.
pub async fn assign_to_project(
    db: &DatabaseConnection,
    contractor_id: Uuid,
    project_id: Uuid,
) -> Result<bool, AppError> {
    require_contractor(db, contractor_id).await?;
    require_project(db, project_id).await?;
    Ok(assignment_db::assign(db, contractor_id, project_id).await?)
}

pub async fn remove_from_project(
    db: &DatabaseConnection,
    contractor_id: Uuid,
    project_id: Uuid,
) -> Result<u64, AppError> {
    require_contractor(db, contractor_id).await?;
    Ok(assignment_db::unassign(db, contractor_id, project_id).await?)
}

/// Delete one stored document of a contractor.
pub async fn delete_document(
    db: &DatabaseConnection,
    store: &DocumentStore,
    contractor_id: Uuid,
    document_id: &str,
) -> Result<(), AppError> {
    require_contractor(db, contractor_id).await?;
    if store.delete(contractor_id, document_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Document {document_id} not found")))
    }
}
