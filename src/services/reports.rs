use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, DbErr};
use uuid::Uuid;

use crate::db::{
    concepts as concept_db, contractors as contractor_db, payments as payment_db,
    projects as project_db, specialties as specialty_db, stats::SeaOrmStatsSource,
};
use crate::error::AppError;
use crate::models::contractors::ContractorWithSpecialty;
use crate::reports::dashboard::{
    ConceptRecord, ContractorDashboard, PaymentRecord, ProjectRef, build_dashboard,
};
use crate::reports::fleet::{FleetStats, compute_fleet_stats};

fn aggregation(context: &'static str) -> impl FnOnce(DbErr) -> AppError {
    move |source| AppError::Aggregation {
        context: context.to_string(),
        source,
    }
}

/// Materialize a contractor's concepts with their project and payments.
pub async fn load_concept_records(
    db: &DatabaseConnection,
    contractor_id: Uuid,
) -> Result<Vec<ConceptRecord>, DbErr> {
    let concepts = concept_db::get_concepts_by_contractor(db, contractor_id).await?;

    let concept_ids: Vec<Uuid> = concepts.iter().map(|c| c.id).collect();
    let mut project_ids: Vec<Uuid> = concepts.iter().map(|c| c.project_id).collect();
    project_ids.sort();
    project_ids.dedup();

    let projects = project_db::get_projects_by_ids(db, &project_ids).await?;
    let mut payments = payment_db::get_payments_by_concepts(db, &concept_ids).await?;

    concepts
        .into_iter()
        .map(|concept| {
            let project = projects.get(&concept.project_id).ok_or_else(|| {
                DbErr::RecordNotFound(format!(
                    "project {} of concept {}",
                    concept.project_id, concept.id
                ))
            })?;
            Ok(ConceptRecord {
                id: concept.id,
                name: concept.name,
                total_amount: concept.total_amount,
                project: ProjectRef {
                    id: project.id,
                    name: project.name.clone(),
                    status: project.status.as_str().to_string(),
                },
                payments: payments
                    .remove(&concept.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|p| PaymentRecord {
                        id: p.id,
                        amount: p.amount,
                        paid_at: p.paid_at,
                        description: p.description,
                        is_advance: p.is_advance,
                    })
                    .collect(),
            })
        })
        .collect()
}

/// Financial progress dashboard of one contractor.
pub async fn contractor_dashboard(
    db: &DatabaseConnection,
    contractor_id: Uuid,
    now: DateTime<Utc>,
) -> Result<ContractorDashboard<ContractorWithSpecialty>, AppError> {
    let contractor = contractor_db::get_contractor_by_id(db, contractor_id)
        .await
        .map_err(aggregation("loading contractor"))?
        .ok_or_else(|| AppError::not_found("Contractor", contractor_id))?;

    let specialty = match contractor.specialty_id {
        Some(id) => specialty_db::get_specialty_by_id(db, id)
            .await
            .map_err(aggregation("loading specialty"))?,
        None => None,
    };

    let records = load_concept_records(db, contractor_id)
        .await
        .map_err(aggregation("loading concepts"))?;

    Ok(build_dashboard(
        ContractorWithSpecialty {
            contractor,
            specialty,
        },
        &records,
        now,
    ))
}

/// Fleet-wide stats over every contractor. Never fails; see
/// [`compute_fleet_stats`].
pub async fn fleet_stats(db: &DatabaseConnection, now: DateTime<Utc>) -> FleetStats {
    compute_fleet_stats(&SeaOrmStatsSource::new(db), now).await
}

