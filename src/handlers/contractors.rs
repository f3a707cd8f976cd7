use actix_multipart::Multipart;
use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::forms::read_contractor_form;
use super::log_failure;
use crate::cache::ResponseCache;
use crate::config::{ContractorDeletePolicy, UploadLimits};
use crate::services::contractors as contractor_service;
use crate::storage::DocumentStore;

/// GET /api/contratistas: every contractor with its projects and specialty.
pub async fn list_contractors(db: web::Data<DatabaseConnection>) -> impl Responder {
    match contractor_service::list_contractors(db.get_ref()).await {
        Ok(contractors) => HttpResponse::Ok().json(contractors),
        Err(e) => {
            log_failure("list_contractors", &e);
            e.legacy_response()
        }
    }
}

/// POST /api/contratistas: create a contractor from a multipart form.
pub async fn create_contractor(
    db: web::Data<DatabaseConnection>,
    store: web::Data<DocumentStore>,
    cache: web::Data<ResponseCache>,
    limits: web::Data<UploadLimits>,
    payload: Multipart,
) -> impl Responder {
    let form = match read_contractor_form(payload, *limits.get_ref()).await {
        Ok(form) => form,
        Err(e) => {
            log_failure("create_contractor", &e);
            return e.legacy_response();
        }
    };

    match contractor_service::create_contractor(db.get_ref(), store.get_ref(), form, chrono::Utc::now())
        .await
    {
        Ok(contractor) => {
            cache.invalidate_contractor(contractor.contractor.id).await;
            HttpResponse::Created().json(contractor)
        }
        Err(e) => {
            log_failure("create_contractor", &e);
            e.legacy_response()
        }
    }
}

/// GET /api/contratistas/{id}: one contractor including its stored documents.
pub async fn get_contractor(
    db: web::Data<DatabaseConnection>,
    store: web::Data<DocumentStore>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();

    match contractor_service::get_contractor(db.get_ref(), store.get_ref(), id).await {
        Ok(contractor) => HttpResponse::Ok().json(contractor),
        Err(e) => {
            log_failure("get_contractor", &e);
            e.legacy_response()
        }
    }
}

/// PUT|POST /api/contratistas/{id}: update a contractor from a multipart form.
///
/// POST is accepted as well since browsers only send multipart bodies with it.
pub async fn update_contractor(
    db: web::Data<DatabaseConnection>,
    store: web::Data<DocumentStore>,
    cache: web::Data<ResponseCache>,
    path: web::Path<Uuid>,
    limits: web::Data<UploadLimits>,
    payload: Multipart,
) -> impl Responder {
    let id = path.into_inner();

    let form = match read_contractor_form(payload, *limits.get_ref()).await {
        Ok(form) => form,
        Err(e) => {
            log_failure("update_contractor", &e);
            return e.legacy_response();
        }
    };

    match contractor_service::update_contractor(
        db.get_ref(),
        store.get_ref(),
        id,
        form,
        chrono::Utc::now(),
    )
    .await
    {
        Ok(contractor) => {
            cache.invalidate_contractor(id).await;
            HttpResponse::Ok().json(contractor)
        }
        Err(e) => {
            log_failure("update_contractor", &e);
            e.legacy_response()
        }
    }
}

/// DELETE /api/contratistas/{id}
pub async fn delete_contractor(
    db: web::Data<DatabaseConnection>,
    store: web::Data<DocumentStore>,
    cache: web::Data<ResponseCache>,
    policy: web::Data<ContractorDeletePolicy>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();

    match contractor_service::delete_contractor(db.get_ref(), store.get_ref(), id, **policy).await {
        Ok(()) => {
            cache.invalidate_contractor(id).await;
            HttpResponse::NoContent().finish()
        }
        Err(e) => {
            log_failure("delete_contractor", &e);
            e.legacy_response()
        }
    }
}

/// POST /api/contratistas/{id}/proyectos/{project_id}
pub async fn assign_to_project(
    db: web::Data<DatabaseConnection>,
    cache: web::Data<ResponseCache>,
    path: web::Path<(Uuid, Uuid)>,
) -> impl Responder {
    let (id, project_id) = path.into_inner();

    match contractor_service::assign_to_project(db.get_ref(), id, project_id).await {
        Ok(_) => {
            cache.invalidate_contractor(id).await;
            HttpResponse::Ok().json(serde_json::json!({
                "message": "Contractor assigned to project",
            }))
        }
        Err(e) => {
            log_failure("assign_to_project", &e);
            e.legacy_response()
        }
    }
}

/// DELETE /api/contratistas/{id}/proyectos/{project_id}
pub async fn remove_from_project(
    db: web::Data<DatabaseConnection>,
    cache: web::Data<ResponseCache>,
    path: web::Path<(Uuid, Uuid)>,
) -> impl Responder {
    let (id, project_id) = path.into_inner();

    match contractor_service::remove_from_project(db.get_ref(), id, project_id).await {
        Ok(_) => {
            cache.invalidate_contractor(id).await;
            HttpResponse::Ok().json(serde_json::json!({
                "message": "Contractor removed from project",
            }))
        }
        Err(e) => {
            log_failure("remove_from_project", &e);
            e.legacy_response()
        }
    }
}

/// DELETE /api/contratistas/{id}/documentos/{document}
pub async fn delete_document(
    db: web::Data<DatabaseConnection>,
    store: web::Data<DocumentStore>,
    path: web::Path<(Uuid, String)>,
) -> impl Responder {
    let (id, document) = path.into_inner();

    match contractor_service::delete_document(db.get_ref(), store.get_ref(), id, &document).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Document deleted",
        })),
        Err(e) => {
            log_failure("delete_document", &e);
            e.legacy_response()
        }
    }
}
