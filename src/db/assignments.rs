use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{contractor_projects, projects};

/// Check whether a contractor is assigned to a project.
pub async fn is_assigned<C: ConnectionTrait>(
    db: &C,
    contractor_id: Uuid,
    project_id: Uuid,
) -> Result<bool, DbErr> {
    let link = contractor_projects::Entity::find_by_id((contractor_id, project_id))
        .one(db)
        .await?;
    Ok(link.is_some())
}

/// Link a contractor to a project. Returns `false` when the link already
/// existed, including when a concurrent request created it first.
pub async fn assign<C: ConnectionTrait>(
    db: &C,
    contractor_id: Uuid,
    project_id: Uuid,
) -> Result<bool, DbErr> {
    let link = contractor_projects::ActiveModel {
        contractor_id: Set(contractor_id),
        project_id: Set(project_id),
        assigned_at: Set(chrono::Utc::now()),
    };

    let inserted = contractor_projects::Entity::insert(link)
        .on_conflict(
            OnConflict::columns([
                contractor_projects::Column::ContractorId,
                contractor_projects::Column::ProjectId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(inserted > 0)
}

/// Remove the link between a contractor and a project.
pub async fn unassign<C: ConnectionTrait>(
    db: &C,
    contractor_id: Uuid,
    project_id: Uuid,
) -> Result<u64, DbErr> {
    let result = contractor_projects::Entity::delete_many()
        .filter(contractor_projects::Column::ContractorId.eq(contractor_id))
        .filter(contractor_projects::Column::ProjectId.eq(project_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Make `project_ids` the exact set of projects the contractor is linked to.
pub async fn sync_projects<C: ConnectionTrait>(
    db: &C,
    contractor_id: Uuid,
    project_ids: &[Uuid],
) -> Result<(), DbErr> {
    let current: Vec<Uuid> = contractor_projects::Entity::find()
        .filter(contractor_projects::Column::ContractorId.eq(contractor_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.project_id)
        .collect();

    let stale: Vec<Uuid> = current
        .iter()
        .copied()
        .filter(|id| !project_ids.contains(id))
        .collect();
    if !stale.is_empty() {
        contractor_projects::Entity::delete_many()
            .filter(contractor_projects::Column::ContractorId.eq(contractor_id))
            .filter(contractor_projects::Column::ProjectId.is_in(stale))
            .exec(db)
            .await?;
    }

    let now = chrono::Utc::now();
    for project_id in project_ids.iter().filter(|id| !current.contains(id)) {
        contractor_projects::ActiveModel {
            contractor_id: Set(contractor_id),
            project_id: Set(*project_id),
            assigned_at: Set(now),
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

/// Remove every project link of a contractor.
pub async fn detach_all<C: ConnectionTrait>(db: &C, contractor_id: Uuid) -> Result<u64, DbErr> {
    let result = contractor_projects::Entity::delete_many()
        .filter(contractor_projects::Column::ContractorId.eq(contractor_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Projects of several contractors in one round trip, keyed by contractor.
///
/// Every requested contractor gets an entry, possibly empty. Projects are
/// ordered by name.
pub async fn get_projects_for_contractors<C: ConnectionTrait>(
    db: &C,
    contractor_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<projects::Model>>, DbErr> {
    let mut by_contractor: HashMap<Uuid, Vec<projects::Model>> = contractor_ids
        .iter()
        .map(|id| (*id, Vec::new()))
        .collect();
    if contractor_ids.is_empty() {
        return Ok(by_contractor);
    }

    let links = contractor_projects::Entity::find()
        .filter(contractor_projects::Column::ContractorId.is_in(contractor_ids.iter().copied()))
        .all(db)
        .await?;

    let mut project_ids: Vec<Uuid> = links.iter().map(|l| l.project_id).collect();
    project_ids.sort();
    project_ids.dedup();
    let projects = super::projects::get_projects_by_ids(db, &project_ids).await?;

    for link in links {
        if let Some(project) = projects.get(&link.project_id) {
            by_contractor
                .entry(link.contractor_id)
                .or_default()
                .push(project.clone());
        }
    }
    for list in by_contractor.values_mut() {
        list.sort_by(|a, b| a.name.cmp(&b.name));
    }

    Ok(by_contractor)
}
