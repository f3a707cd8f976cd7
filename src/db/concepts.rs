use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::concepts::{self, CreateConcept};

/// Fetch every concept of a contractor, oldest first.
pub async fn get_concepts_by_contractor<C: ConnectionTrait>(
    db: &C,
    contractor_id: Uuid,
) -> Result<Vec<concepts::Model>, DbErr> {
    concepts::Entity::find()
        .filter(concepts::Column::ContractorId.eq(contractor_id))
        .order_by_asc(concepts::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch the concepts of a contractor on one project, oldest first.
pub async fn get_concepts_by_contractor_and_project<C: ConnectionTrait>(
    db: &C,
    contractor_id: Uuid,
    project_id: Uuid,
) -> Result<Vec<concepts::Model>, DbErr> {
    concepts::Entity::find()
        .filter(concepts::Column::ContractorId.eq(contractor_id))
        .filter(concepts::Column::ProjectId.eq(project_id))
        .order_by_asc(concepts::Column::CreatedAt)
        .all(db)
        .await
}

/// Count the concepts still owned by a contractor.
pub async fn count_concepts_by_contractor<C: ConnectionTrait>(
    db: &C,
    contractor_id: Uuid,
) -> Result<u64, DbErr> {
    concepts::Entity::find()
        .filter(concepts::Column::ContractorId.eq(contractor_id))
        .count(db)
        .await
}

/// Insert a concept for a contractor on a project.
pub async fn insert_concept<C: ConnectionTrait>(
    db: &C,
    contractor_id: Uuid,
    project_id: Uuid,
    input: &CreateConcept,
    now: DateTime<Utc>,
) -> Result<concepts::Model, DbErr> {
    concepts::ActiveModel {
        id: Set(Uuid::new_v4()),
        contractor_id: Set(Some(contractor_id)),
        project_id: Set(project_id),
        name: Set(input.name.trim().to_string()),
        description: Set(input.description.clone()),
        total_amount: Set(input.total_amount.unwrap_or(Decimal::ZERO)),
        created_at: Set(now),
    }
    .insert(db)
    .await
}

/// Detach a contractor's concepts from it, keeping them and their payments.
pub async fn orphan_concepts_of_contractor<C: ConnectionTrait>(
    db: &C,
    contractor_id: Uuid,
) -> Result<u64, DbErr> {
    let result = concepts::Entity::update_many()
        .col_expr(concepts::Column::ContractorId, Expr::value(Option::<Uuid>::None))
        .filter(concepts::Column::ContractorId.eq(contractor_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Delete a contractor's concepts together with their payments.
pub async fn delete_concepts_of_contractor<C: ConnectionTrait>(
    db: &C,
    contractor_id: Uuid,
) -> Result<u64, DbErr> {
    let ids: Vec<Uuid> = get_concepts_by_contractor(db, contractor_id)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();
    if ids.is_empty() {
        return Ok(0);
    }

    super::payments::delete_payments_by_concepts(db, &ids).await?;
    let result = concepts::Entity::delete_many()
        .filter(concepts::Column::Id.is_in(ids))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
