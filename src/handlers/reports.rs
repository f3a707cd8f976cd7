use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::log_failure;
use crate::cache::ResponseCache;
use crate::services::reports as report_service;

/// GET /api/contratistas/{id}/dashboard: financial progress of one contractor.
pub async fn contractor_dashboard(
    db: web::Data<DatabaseConnection>,
    cache: web::Data<ResponseCache>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();

    if let Some(cached) = cache.dashboard(id).await {
        return HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": cached,
        }));
    }

    match report_service::contractor_dashboard(db.get_ref(), id, chrono::Utc::now()).await {
        Ok(dashboard) => {
            cache.store_dashboard(id, &dashboard).await;
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "data": dashboard,
            }))
        }
        Err(e) => {
            log_failure("contractor_dashboard", &e);
            e.envelope_response()
        }
    }
}

/// GET /api/contratistas/stats: fleet-wide stats.
///
/// Always 200: failing sections degrade and the body carries an `error` when
/// the totals could not be computed.
pub async fn fleet_stats(
    db: web::Data<DatabaseConnection>,
    cache: web::Data<ResponseCache>,
) -> impl Responder {
    if let Some(cached) = cache.fleet_stats().await {
        return HttpResponse::Ok().json(cached);
    }

    let stats = report_service::fleet_stats(db.get_ref(), chrono::Utc::now()).await;
    if stats.is_degraded() {
        tracing::warn!(error = stats.error.as_deref().unwrap_or_default(), "Serving degraded fleet stats");
    } else {
        cache.store_fleet_stats(&stats).await;
    }

    HttpResponse::Ok().json(stats)
}
