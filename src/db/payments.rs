use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::payments;

/// Payments of several concepts in one query, keyed by concept and ordered by
/// date.
pub async fn get_payments_by_concepts<C: ConnectionTrait>(
    db: &C,
    concept_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<payments::Model>>, DbErr> {
    let mut by_concept: HashMap<Uuid, Vec<payments::Model>> = HashMap::new();
    if concept_ids.is_empty() {
        return Ok(by_concept);
    }

    let rows = payments::Entity::find()
        .filter(payments::Column::ConceptId.is_in(concept_ids.iter().copied()))
        .order_by_asc(payments::Column::PaidAt)
        .all(db)
        .await?;

    for payment in rows {
        by_concept.entry(payment.concept_id).or_default().push(payment);
    }
    Ok(by_concept)
}

/// Record the down payment made when a concept is created.
pub async fn insert_advance_payment<C: ConnectionTrait>(
    db: &C,
    concept_id: Uuid,
    project_id: Uuid,
    amount: Decimal,
    description: String,
    now: DateTime<Utc>,
) -> Result<payments::Model, DbErr> {
    payments::ActiveModel {
        id: Set(Uuid::new_v4()),
        concept_id: Set(concept_id),
        project_id: Set(Some(project_id)),
        amount: Set(amount),
        paid_at: Set(now),
        description: Set(Some(description)),
        is_advance: Set(true),
        created_at: Set(now),
    }
    .insert(db)
    .await
}

/// Delete every payment of the given concepts.
pub async fn delete_payments_by_concepts<C: ConnectionTrait>(
    db: &C,
    concept_ids: &[Uuid],
) -> Result<u64, DbErr> {
    if concept_ids.is_empty() {
        return Ok(0);
    }
    let result = payments::Entity::delete_many()
        .filter(payments::Column::ConceptId.is_in(concept_ids.iter().copied()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
