pub mod catalog;
pub mod concepts;
pub mod contractors;
pub mod forms;
pub mod reports;

use actix_web::{HttpResponse, error, web};

use crate::error::AppError;

/// Log a failed operation at a level matching its status.
pub(crate) fn log_failure(operation: &'static str, error: &AppError) {
    if error.status_code().is_server_error() {
        tracing::error!(operation, "{error}");
    } else {
        tracing::info!(operation, status = error.status_code().as_u16(), "{error}");
    }
}

/// Malformed concept bodies answer in the `{success, message}` envelope.
fn concept_json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::UnprocessableEntity().json(serde_json::json!({
            "success": false,
            "message": format!("Invalid request body: {err}"),
        }));
        error::InternalError::from_response(err, response).into()
    })
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Contractor routes ──
    // `/stats` must be registered before `/{id}`.
    cfg.service(
        web::scope("/contratistas")
            .app_data(concept_json_config())
            .route("", web::get().to(contractors::list_contractors))
            .route("", web::post().to(contractors::create_contractor))
            .route("/stats", web::get().to(reports::fleet_stats))
            .route("/{id}", web::get().to(contractors::get_contractor))
            .route("/{id}", web::put().to(contractors::update_contractor))
            .route("/{id}", web::post().to(contractors::update_contractor))
            .route("/{id}", web::delete().to(contractors::delete_contractor))
            .route(
                "/{id}/proyectos/{project_id}",
                web::post().to(contractors::assign_to_project),
            )
            .route(
                "/{id}/proyectos/{project_id}",
                web::delete().to(contractors::remove_from_project),
            )
            .route(
                "/{id}/documentos/{document}",
                web::delete().to(contractors::delete_document),
            )
            .route("/{id}/conceptos", web::get().to(concepts::list_concepts))
            .route(
                "/{id}/proyectos/{project_id}/conceptos",
                web::get().to(concepts::list_project_concepts),
            )
            .route(
                "/{id}/proyectos/{project_id}/conceptos",
                web::post().to(concepts::create_concept),
            )
            .route("/{id}/dashboard", web::get().to(reports::contractor_dashboard)),
    );

    // ── Catalog routes ──
    cfg.service(
        web::resource("/proyectos")
            .route(web::get().to(catalog::get_projects))
            .route(web::post().to(catalog::create_project)),
    );
    cfg.service(
        web::resource("/especialidades")
            .route(web::get().to(catalog::get_specialties))
            .route(web::post().to(catalog::create_specialty)),
    );
}
