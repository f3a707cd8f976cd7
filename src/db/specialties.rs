use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::specialties::{self, CreateSpecialty};

/// Fetch all specialties ordered by name.
pub async fn get_all_specialties<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<specialties::Model>, DbErr> {
    specialties::Entity::find()
        .order_by_asc(specialties::Column::Name)
        .all(db)
        .await
}

/// Fetch a single specialty by ID.
pub async fn get_specialty_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<specialties::Model>, DbErr> {
    specialties::Entity::find_by_id(id).one(db).await
}

/// Fetch the specialties with the given IDs, keyed by ID.
pub async fn get_specialties_by_ids<C: ConnectionTrait>(
    db: &C,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, specialties::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = specialties::Entity::find()
        .filter(specialties::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|s| (s.id, s)).collect())
}

/// Insert a new specialty.
pub async fn insert_specialty<C: ConnectionTrait>(
    db: &C,
    input: CreateSpecialty,
) -> Result<specialties::Model, DbErr> {
    specialties::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await
}
