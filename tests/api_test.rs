//! HTTP-level tests: routing, envelopes and status codes.
//!
//! Run with: `cargo test --test api_test`
mod common;

use actix_web::{App, http::StatusCode, test, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use common::*;
use contractor_backend::cache::ResponseCache;
use contractor_backend::config::{ContractorDeletePolicy, UploadLimits};
use contractor_backend::handlers;
use contractor_backend::storage::DocumentStore;

const BOUNDARY: &str = "----contractor-test-boundary";

macro_rules! app {
    ($db:expr, $store:expr) => {
        app!($db, $store, UploadLimits::default())
    };
    ($db:expr, $store:expr, $limits:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($db.clone()))
                .app_data(web::Data::new($store.clone()))
                .app_data(web::Data::new(ResponseCache::disabled()))
                .app_data(web::Data::new(ContractorDeletePolicy::Orphan))
                .app_data(web::Data::new($limits))
                .service(web::scope("/api").configure(handlers::init_routes)),
        )
        .await
    };
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str)>) -> Vec<u8> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    if let Some((file_name, contents)) = file {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"documentos[]\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n{contents}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body.into_bytes()
}

async fn setup() -> (DatabaseConnection, DocumentStore, tempfile::TempDir) {
    let db = setup_db().await;
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path(), "/storage");
    (db, store, dir)
}

#[actix_web::test]
async fn test_stats_route_is_not_taken_for_an_id() {
    let (db, store, _dir) = setup().await;
    let app = app!(db, store);

    let req = test::TestRequest::get().uri("/api/contratistas/stats").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["pagosPorMes"], serde_json::json!([]));
    assert!(body.get("error").is_none());
}

#[actix_web::test]
async fn test_dashboard_envelopes() {
    let (db, store, _dir) = setup().await;
    let contractor = seed_contractor(&db, "Acme").await;
    let app = app!(db, store);

    let req = test::TestRequest::get()
        .uri(&format!("/api/contratistas/{}/dashboard", contractor.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["contratista"]["nombre"], "Acme");
    assert_eq!(body["data"]["resumen"]["total_proyectos"], 0);
    assert_eq!(body["data"]["pagos_por_mes"].as_array().unwrap().len(), 6);

    let req = test::TestRequest::get()
        .uri(&format!("/api/contratistas/{}/dashboard", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[actix_web::test]
async fn test_concept_creation_over_http() {
    let (db, store, _dir) = setup().await;
    let contractor = seed_contractor(&db, "Acme").await;
    let project = seed_project(&db, "Tower").await;
    let app = app!(db, store);
    let uri = format!(
        "/api/contratistas/{}/proyectos/{}/conceptos",
        contractor.id, project.id
    );
    let body = serde_json::json!({"nombre": "Walls", "monto_total": 1000, "anticipo": 200});

    // Not assigned yet.
    let req = test::TestRequest::post().uri(&uri).set_json(&body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["success"], false);

    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/contratistas/{}/proyectos/{}",
            contractor.id, project.id
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post().uri(&uri).set_json(&body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["nombre"], "Walls");
    assert_eq!(json["data"]["pagos"][0]["es_anticipo"], true);
    assert_eq!(json["data"]["pagos"][0]["monto"], serde_json::json!(200.0));

    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    // Missing monto_total.
    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(serde_json::json!({"nombre": "Roof"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_contractor_lifecycle_over_http() {
    let (db, store, _dir) = setup().await;
    let project = seed_project(&db, "Tower").await;
    let app = app!(db, store);

    let projects = format!(r#"["{}"]"#, project.id);
    let payload = multipart_body(
        &[
            ("nombre", "Acme Builders"),
            ("rfc", "ACM010101AB1"),
            ("telefono", "5550001111"),
            ("proyectos", &projects),
        ],
        Some(("license.pdf", "%PDF-1.4")),
    );
    let req = test::TestRequest::post()
        .uri("/api/contratistas")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(created["nombre"], "Acme Builders");
    assert_eq!(created["proyectos"][0]["nombre"], "Tower");
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/contratistas/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: serde_json::Value = test::read_body_json(resp).await;
    let documents = fetched["documentos"].as_array().unwrap();
    assert_eq!(documents.len(), 1);
    let document_id = documents[0]["id"].as_str().unwrap().to_string();
    assert!(documents[0]["url"].as_str().unwrap().starts_with("/storage/contratistas/"));

    let req = test::TestRequest::delete()
        .uri(&format!("/api/contratistas/{id}/documentos/{document_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/contratistas/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/contratistas/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn test_contractor_form_validation_over_http() {
    let (db, store, _dir) = setup().await;
    let app = app!(db, store);

    let payload = multipart_body(&[("nombre", "Acme")], None);
    let req = test::TestRequest::post()
        .uri("/api/contratistas")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("rfc"));
}

#[actix_web::test]
async fn test_oversize_upload_is_rejected() {
    let (db, store, dir) = setup().await;
    let limits = UploadLimits {
        max_part_bytes: 64,
        max_form_bytes: 1024,
    };
    let app = app!(db, store, limits);

    let document = "x".repeat(65);
    let payload = multipart_body(
        &[
            ("nombre", "Acme"),
            ("rfc", "ACM010101AB1"),
            ("telefono", "5550001111"),
        ],
        Some(("license.pdf", &document)),
    );
    let req = test::TestRequest::post()
        .uri("/api/contratistas")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("64 bytes"));

    let req = test::TestRequest::get().uri("/api/contratistas").to_request();
    let contractors: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(contractors, serde_json::json!([]));
    assert!(!dir.path().join("contratistas").exists());
}

#[actix_web::test]
async fn test_oversize_form_is_rejected() {
    let (db, store, _dir) = setup().await;
    let limits = UploadLimits {
        max_part_bytes: 64,
        max_form_bytes: 100,
    };
    let app = app!(db, store, limits);

    // Every part fits on its own; together they do not.
    let filler = "y".repeat(60);
    let payload = multipart_body(
        &[
            ("nombre", "Acme"),
            ("rfc", "ACM010101AB1"),
            ("telefono", "5550001111"),
            ("notas", &filler),
        ],
        Some(("license.pdf", &filler)),
    );
    let req = test::TestRequest::post()
        .uri("/api/contratistas")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("100 bytes"));
}

#[actix_web::test]
async fn test_catalog_endpoints() {
    let (db, store, _dir) = setup().await;
    let app = app!(db, store);

    let req = test::TestRequest::post()
        .uri("/api/especialidades")
        .set_json(serde_json::json!({"nombre": "Electrical"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/proyectos")
        .set_json(serde_json::json!({"nombre": "Tower", "estado": "active"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let project: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(project["estado"], "active");

    let req = test::TestRequest::post()
        .uri("/api/proyectos")
        .set_json(serde_json::json!({"nombre": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::get().uri("/api/proyectos").to_request();
    let projects: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(projects.as_array().unwrap().len(), 1);
}
