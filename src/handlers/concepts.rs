use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::log_failure;
use crate::cache::ResponseCache;
use crate::models::concepts::CreateConcept;
use crate::services::concepts as concept_service;

/// GET /api/contratistas/{id}/conceptos: concepts with project and payments.
pub async fn list_concepts(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();

    match concept_service::list_concepts(db.get_ref(), id).await {
        Ok(concepts) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": concepts,
        })),
        Err(e) => {
            log_failure("list_concepts", &e);
            e.envelope_response()
        }
    }
}

/// GET /api/contratistas/{id}/proyectos/{project_id}/conceptos
///
/// 422 when the contractor is not assigned to the project.
pub async fn list_project_concepts(
    db: web::Data<DatabaseConnection>,
    path: web::Path<(Uuid, Uuid)>,
) -> impl Responder {
    let (id, project_id) = path.into_inner();

    match concept_service::list_project_concepts(db.get_ref(), id, project_id).await {
        Ok(concepts) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": concepts,
        })),
        Err(e) => {
            log_failure("list_project_concepts", &e);
            e.envelope_response()
        }
    }
}

/// POST /api/contratistas/{id}/proyectos/{project_id}/conceptos
///
/// A positive `anticipo` is recorded as an advance payment in the same
/// transaction as the concept.
pub async fn create_concept(
    db: web::Data<DatabaseConnection>,
    cache: web::Data<ResponseCache>,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CreateConcept>,
) -> impl Responder {
    let (id, project_id) = path.into_inner();

    match concept_service::create_concept(
        db.get_ref(),
        id,
        project_id,
        body.into_inner(),
        chrono::Utc::now(),
    )
    .await
    {
        Ok(concept) => {
            cache.invalidate_contractor(id).await;
            HttpResponse::Created().json(serde_json::json!({
                "success": true,
                "message": "Concept created",
                "data": concept,
            }))
        }
        Err(e) => {
            log_failure("create_concept", &e);
            e.envelope_response()
        }
    }
}
