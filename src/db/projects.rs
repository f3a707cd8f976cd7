use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::projects::{self, CreateProject};

/// Fetch all projects ordered by name.
pub async fn get_all_projects<C: ConnectionTrait>(db: &C) -> Result<Vec<projects::Model>, DbErr> {
    projects::Entity::find()
        .order_by_asc(projects::Column::Name)
        .all(db)
        .await
}

/// Fetch a single project by ID.
pub async fn get_project_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<projects::Model>, DbErr> {
    projects::Entity::find_by_id(id).one(db).await
}

/// Fetch the projects with the given IDs, keyed by ID.
pub async fn get_projects_by_ids<C: ConnectionTrait>(
    db: &C,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, projects::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = projects::Entity::find()
        .filter(projects::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|p| (p.id, p)).collect())
}

/// IDs from `ids` that do not reference an existing project.
pub async fn find_missing_project_ids<C: ConnectionTrait>(
    db: &C,
    ids: &[Uuid],
) -> Result<Vec<Uuid>, DbErr> {
    let found = get_projects_by_ids(db, ids).await?;
    Ok(ids
        .iter()
        .copied()
        .filter(|id| !found.contains_key(id))
        .collect())
}

/// Insert a new project (defaults to Planned status).
pub async fn insert_project<C: ConnectionTrait>(
    db: &C,
    input: CreateProject,
) -> Result<projects::Model, DbErr> {
    projects::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name.trim().to_string()),
        status: Set(input.status.unwrap_or_default()),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await
}
