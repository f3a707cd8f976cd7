use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{concepts, contractor_projects, contractors, payments, projects};
use crate::reports::fleet::{ContractorBilling, FleetStatsSource, PaymentPoint, ProjectHeadcount};

/// Fleet stats queries against the relational store.
pub struct SeaOrmStatsSource<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SeaOrmStatsSource<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Payments whose concept still has a contractor.
    fn owned_payments(&self) -> Select<payments::Entity> {
        payments::Entity::find()
            .inner_join(concepts::Entity)
            .filter(concepts::Column::ContractorId.is_not_null())
    }
}

#[async_trait]
impl FleetStatsSource for SeaOrmStatsSource<'_> {
    type Error = DbErr;

    async fn contractor_count(&self) -> Result<u64, DbErr> {
        contractors::Entity::find().count(self.db).await
    }

    async fn concept_amount_total(&self) -> Result<Decimal, DbErr> {
        let total: Option<Option<Decimal>> = concepts::Entity::find()
            .select_only()
            .column_as(concepts::Column::TotalAmount.sum(), "total_amount")
            .filter(concepts::Column::ContractorId.is_not_null())
            .into_tuple()
            .one(self.db)
            .await?;
        // SUM over no rows is NULL.
        Ok(total.flatten().unwrap_or_default())
    }

    async fn paid_total(&self) -> Result<Decimal, DbErr> {
        let total: Option<Option<Decimal>> = self
            .owned_payments()
            .select_only()
            .column_as(payments::Column::Amount.sum(), "paid")
            .into_tuple()
            .one(self.db)
            .await?;
        Ok(total.flatten().unwrap_or_default())
    }

    async fn contractors_by_project(&self) -> Result<Vec<ProjectHeadcount>, DbErr> {
        let counts: Vec<(Uuid, i64)> = contractor_projects::Entity::find()
            .select_only()
            .column(contractor_projects::Column::ProjectId)
            .column_as(contractor_projects::Column::ContractorId.count(), "total")
            .group_by(contractor_projects::Column::ProjectId)
            .into_tuple()
            .all(self.db)
            .await?;
        let counts: HashMap<Uuid, u64> = counts
            .into_iter()
            .map(|(project_id, total)| (project_id, Ord::max(total, 0) as u64))
            .collect();

        let project_ids: Vec<Uuid> = counts.keys().copied().collect();
        let names = super::projects::get_projects_by_ids(self.db, &project_ids).await?;

        let mut rows: Vec<ProjectHeadcount> = names
            .into_values()
            .map(|project: projects::Model| ProjectHeadcount {
                total: counts.get(&project.id).copied().unwrap_or(0),
                project_id: project.id,
                name: project.name,
            })
            .collect();
        rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
        Ok(rows)
    }

    async fn concepts_by_contractor(&self) -> Result<Vec<ContractorBilling>, DbErr> {
        let grouped: Vec<(Uuid, i64, Option<Decimal>)> = concepts::Entity::find()
            .select_only()
            .column(concepts::Column::ContractorId)
            .column_as(concepts::Column::Id.count(), "concept_count")
            .column_as(concepts::Column::TotalAmount.sum(), "total_amount")
            .filter(concepts::Column::ContractorId.is_not_null())
            .group_by(concepts::Column::ContractorId)
            .into_tuple()
            .all(self.db)
            .await?;
        let billing: HashMap<Uuid, (u64, Decimal)> = grouped
            .into_iter()
            .map(|(contractor_id, count, total)| {
                (contractor_id, (Ord::max(count, 0) as u64, total.unwrap_or_default()))
            })
            .collect();

        let contractor_ids: Vec<Uuid> = billing.keys().copied().collect();
        let owners = super::contractors::get_contractors_by_ids(self.db, &contractor_ids).await?;

        let mut result: Vec<ContractorBilling> = owners
            .into_iter()
            .map(|contractor| {
                let (concept_count, total_amount) =
                    billing.get(&contractor.id).copied().unwrap_or_default();
                ContractorBilling {
                    contractor_id: contractor.id,
                    name: contractor.name,
                    concept_count,
                    total_amount,
                }
            })
            .collect();
        result.sort_by(|a, b| {
            b.total_amount
                .cmp(&a.total_amount)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(result)
    }

    async fn payments_since(&self, since: DateTime<Utc>) -> Result<Vec<PaymentPoint>, DbErr> {
        let rows = self
            .owned_payments()
            .filter(payments::Column::PaidAt.gte(since))
            .order_by_asc(payments::Column::PaidAt)
            .all(self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|p| PaymentPoint {
                paid_at: p.paid_at,
                amount: p.amount,
            })
            .collect())
    }
}
