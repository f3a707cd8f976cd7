//! Input validation and configuration parsing.
//!
//! Run with: `cargo test --test validation_test`
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use contractor_backend::config::{AppConfig, ConfigError, ContractorDeletePolicy, UploadLimits};
use contractor_backend::error::AppError;
use contractor_backend::models::concepts::CreateConcept;
use contractor_backend::models::contractors::ContractorForm;

fn concept(name: &str, total: Option<i64>, advance: Option<i64>) -> CreateConcept {
    CreateConcept {
        name: name.to_string(),
        description: None,
        total_amount: total.map(Decimal::from),
        advance: advance.map(Decimal::from),
    }
}

fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_concept_validation() {
    assert!(concept("Walls", Some(1000), Some(200)).validate().is_ok());
    assert!(concept("Walls", Some(0), None).validate().is_ok());

    let err = concept("  ", Some(1000), None).validate().unwrap_err();
    assert!(matches!(err, AppError::Validation(ref m) if m.contains("nombre")));

    let err = concept("Walls", None, None).validate().unwrap_err();
    assert!(matches!(err, AppError::Validation(ref m) if m.contains("monto_total")));

    let err = concept("Walls", Some(-1), None).validate().unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = concept("Walls", Some(10), Some(-5)).validate().unwrap_err();
    assert!(matches!(err, AppError::Validation(ref m) if m.contains("anticipo")));

    let long = "x".repeat(256);
    assert!(concept(&long, Some(10), None).validate().is_err());
}

#[test]
fn test_zero_advance_records_nothing() {
    assert_eq!(concept("Walls", Some(1000), Some(0)).positive_advance(), None);
    assert_eq!(concept("Walls", Some(1000), None).positive_advance(), None);
    assert_eq!(
        concept("Walls", Some(1000), Some(200)).positive_advance(),
        Some(Decimal::from(200))
    );
}

#[test]
fn test_concept_body_uses_wire_names() {
    let body: CreateConcept = serde_json::from_value(serde_json::json!({
        "nombre": "Walls",
        "descripcion": "Block walls",
        "monto_total": 1000.5,
        "anticipo": 200,
    }))
    .unwrap();

    assert_eq!(body.name, "Walls");
    assert_eq!(body.description.as_deref(), Some("Block walls"));
    assert_eq!(body.total_amount, Some(Decimal::new(10005, 1)));
    assert_eq!(body.advance, Some(Decimal::from(200)));
}

#[test]
fn test_contractor_form_parses_fields() {
    let project = Uuid::new_v4();
    let specialty = Uuid::new_v4();
    let raw_projects = format!(r#"["{project}", "{project}"]"#);
    let form = ContractorForm::from_fields(
        &fields(&[
            ("nombre", " Acme Builders "),
            ("rfc", "ACM010101AB1"),
            ("telefono", "5550001111"),
            ("especialidad_id", &specialty.to_string()),
            ("proyectos", &raw_projects),
        ]),
        Vec::new(),
    )
    .unwrap();

    assert_eq!(form.name, "Acme Builders");
    assert_eq!(form.specialty_id, Some(specialty));
    assert_eq!(form.project_ids, Some(vec![project]));
}

#[test]
fn test_contractor_form_optional_fields() {
    let base = [
        ("nombre", "Acme"),
        ("rfc", "ACM010101AB1"),
        ("telefono", "5550001111"),
    ];

    let form = ContractorForm::from_fields(&fields(&base), Vec::new()).unwrap();
    assert_eq!(form.specialty_id, None);
    assert_eq!(form.project_ids, None);

    let mut with_empty = base.to_vec();
    with_empty.push(("proyectos", "[]"));
    with_empty.push(("especialidad_id", "null"));
    let form = ContractorForm::from_fields(&fields(&with_empty), Vec::new()).unwrap();
    assert_eq!(form.project_ids, Some(Vec::new()));
    assert_eq!(form.specialty_id, None);
}

#[test]
fn test_contractor_form_rejects_bad_input() {
    let missing = ContractorForm::from_fields(&fields(&[("nombre", "Acme")]), Vec::new());
    assert!(matches!(missing, Err(AppError::Validation(ref m)) if m.contains("rfc")));

    let long_rfc = ContractorForm::from_fields(
        &fields(&[
            ("nombre", "Acme"),
            ("rfc", "ACM010101AB1XX"),
            ("telefono", "555"),
        ]),
        Vec::new(),
    );
    assert!(matches!(long_rfc, Err(AppError::Validation(ref m)) if m.contains("13")));

    let bad_projects = ContractorForm::from_fields(
        &fields(&[
            ("nombre", "Acme"),
            ("rfc", "ACM"),
            ("telefono", "555"),
            ("proyectos", "not json"),
        ]),
        Vec::new(),
    );
    assert!(matches!(bad_projects, Err(AppError::Validation(_))));
}

#[test]
fn test_error_status_codes() {
    assert_eq!(AppError::not_found("Contractor", 1).status_code(), 404);
    assert_eq!(AppError::Validation("x".into()).status_code(), 422);
    assert_eq!(AppError::AssignmentViolation("x".into()).status_code(), 422);
    assert_eq!(AppError::Conflict("x".into()).status_code(), 409);
    assert_eq!(
        AppError::Transaction(sea_orm::DbErr::Custom("boom".into())).status_code(),
        500
    );
}

#[test]
fn test_config_defaults() {
    let config = AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://localhost/contractors".to_string()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    assert_eq!(config.storage_public_path, "/storage");
    assert_eq!(config.delete_policy, ContractorDeletePolicy::Orphan);
    assert!(!config.run_migrations);
    assert!(config.redis_url.is_none());
    assert_eq!(config.upload_limits, UploadLimits::default());
}

#[test]
fn test_config_overrides_and_errors() {
    let env: HashMap<&str, &str> = [
        ("DATABASE_URL", "postgres://db/contractors"),
        ("PORT", "9000"),
        ("CONTRACTOR_DELETE_POLICY", "Cascade"),
        ("RUN_MIGRATIONS", "yes"),
        ("REDIS_URL", "redis://cache:6379"),
        ("UPLOAD_MAX_PART_BYTES", "1048576"),
    ]
    .into_iter()
    .collect();
    let config = AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap();
    assert_eq!(config.port, 9000);
    assert_eq!(config.delete_policy, ContractorDeletePolicy::Cascade);
    assert!(config.run_migrations);
    assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
    assert_eq!(config.upload_limits.max_part_bytes, 1_048_576);
    assert_eq!(
        config.upload_limits.max_form_bytes,
        UploadLimits::default().max_form_bytes
    );

    let missing = AppConfig::from_lookup(|_| None);
    assert!(matches!(missing, Err(ConfigError::Missing("DATABASE_URL"))));

    let bad_policy = AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://db".to_string()),
        "CONTRACTOR_DELETE_POLICY" => Some("shred".to_string()),
        _ => None,
    });
    assert!(matches!(
        bad_policy,
        Err(ConfigError::Invalid { key: "CONTRACTOR_DELETE_POLICY", .. })
    ));

    let zero_limit = AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://db".to_string()),
        "UPLOAD_MAX_FORM_BYTES" => Some("0".to_string()),
        _ => None,
    });
    assert!(matches!(
        zero_limit,
        Err(ConfigError::Invalid { key: "UPLOAD_MAX_FORM_BYTES", .. })
    ));

    assert_eq!(
        "restrict".parse::<ContractorDeletePolicy>().unwrap(),
        ContractorDeletePolicy::Restrict
    );
}
