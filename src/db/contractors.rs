use chrono::{DateTime, Utc};
use sea_orm::*;
use uuid::Uuid;

use crate::models::contractors::{self, ContractorForm};

/// Fetch all contractors ordered by name.
pub async fn get_all_contractors<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<contractors::Model>, DbErr> {
    contractors::Entity::find()
        .order_by_asc(contractors::Column::Name)
        .all(db)
        .await
}

/// Fetch a single contractor by ID.
pub async fn get_contractor_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<contractors::Model>, DbErr> {
    contractors::Entity::find_by_id(id).one(db).await
}

/// Fetch the contractors with the given IDs.
pub async fn get_contractors_by_ids<C: ConnectionTrait>(
    db: &C,
    ids: &[Uuid],
) -> Result<Vec<contractors::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    contractors::Entity::find()
        .filter(contractors::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await
}

/// Insert a new contractor from a validated form.
pub async fn insert_contractor<C: ConnectionTrait>(
    db: &C,
    form: &ContractorForm,
    now: DateTime<Utc>,
) -> Result<contractors::Model, DbErr> {
    contractors::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(form.name.clone()),
        tax_id: Set(form.tax_id.clone()),
        phone: Set(form.phone.clone()),
        specialty_id: Set(form.specialty_id),
        created_at: Set(now),
        updated_at: Set(None),
    }
    .insert(db)
    .await
}

/// Overwrite a contractor's fields from a validated form.
pub async fn update_contractor<C: ConnectionTrait>(
    db: &C,
    contractor: contractors::Model,
    form: &ContractorForm,
    now: DateTime<Utc>,
) -> Result<contractors::Model, DbErr> {
    let mut active: contractors::ActiveModel = contractor.into();
    active.name = Set(form.name.clone());
    active.tax_id = Set(form.tax_id.clone());
    active.phone = Set(form.phone.clone());
    active.specialty_id = Set(form.specialty_id);
    active.updated_at = Set(Some(now));

    active.update(db).await
}

/// Delete a contractor by ID.
pub async fn delete_contractor<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<DeleteResult, DbErr> {
    contractors::Entity::delete_by_id(id).exec(db).await
}
