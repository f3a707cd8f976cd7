use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;

use crate::db::projects as project_db;
use crate::db::specialties as specialty_db;
use crate::models::projects::CreateProject;
use crate::models::specialties::CreateSpecialty;

const NAME_MAX_LEN: usize = 255;

fn invalid_name(name: &str) -> Option<HttpResponse> {
    let name = name.trim();
    if name.is_empty() {
        return Some(HttpResponse::UnprocessableEntity().json(serde_json::json!({
            "error": "The nombre field is required",
        })));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Some(HttpResponse::UnprocessableEntity().json(serde_json::json!({
            "error": format!("The nombre field must not exceed {NAME_MAX_LEN} characters"),
        })));
    }
    None
}

/// GET /api/proyectos
pub async fn get_projects(db: web::Data<DatabaseConnection>) -> impl Responder {
    match project_db::get_all_projects(db.get_ref()).await {
        Ok(projects) => HttpResponse::Ok().json(projects),
        Err(e) => {
            tracing::error!("Failed to fetch projects: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {e}"),
            }))
        }
    }
}

/// POST /api/proyectos
pub async fn create_project(
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateProject>,
) -> impl Responder {
    if let Some(rejection) = invalid_name(&body.name) {
        return rejection;
    }

    match project_db::insert_project(db.get_ref(), body.into_inner()).await {
        Ok(project) => HttpResponse::Created().json(project),
        Err(e) => {
            tracing::error!("Failed to create project: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to create project: {e}"),
            }))
        }
    }
}

/// GET /api/especialidades
pub async fn get_specialties(db: web::Data<DatabaseConnection>) -> impl Responder {
    match specialty_db::get_all_specialties(db.get_ref()).await {
        Ok(specialties) => HttpResponse::Ok().json(specialties),
        Err(e) => {
            tracing::error!("Failed to fetch specialties: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {e}"),
            }))
        }
    }
}

/// POST /api/especialidades
pub async fn create_specialty(
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateSpecialty>,
) -> impl Responder {
    if let Some(rejection) = invalid_name(&body.name) {
        return rejection;
    }

    match specialty_db::insert_specialty(db.get_ref(), body.into_inner()).await {
        Ok(specialty) => HttpResponse::Created().json(specialty),
        Err(e) => {
            tracing::error!("Failed to create specialty: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to create specialty: {e}"),
            }))
        }
    }
}
