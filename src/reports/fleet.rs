use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use uuid::Uuid;

use super::progress::YearMonth;

/// Months before the current one covered by `pagosPorMes`.
pub const PAYMENT_WINDOW_MONTHS: u32 = 5;

/// Contractors assigned to one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectHeadcount {
    #[serde(rename = "proyecto_id")]
    pub project_id: Uuid,
    #[serde(rename = "nombre")]
    pub name: String,
    pub total: u64,
}

/// Concept volume billed by one contractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractorBilling {
    #[serde(rename = "contratista_id")]
    pub contractor_id: Uuid,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "total_conceptos")]
    pub concept_count: u64,
    #[serde(rename = "monto_total")]
    pub total_amount: Decimal,
}

/// A payment reduced to what the monthly grouping needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentPoint {
    pub paid_at: DateTime<Utc>,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    #[serde(rename = "año")]
    pub year: i32,
    #[serde(rename = "mes")]
    pub month: u32,
    #[serde(rename = "etiqueta")]
    pub label: String,
    pub total: Decimal,
    #[serde(rename = "cantidad_pagos")]
    pub payment_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FleetStats {
    pub total: u64,
    #[serde(rename = "totalConceptos")]
    pub concept_total: Decimal,
    #[serde(rename = "totalPagado")]
    pub paid_total: Decimal,
    #[serde(rename = "contratistasPorProyecto")]
    pub contractors_by_project: Vec<ProjectHeadcount>,
    #[serde(rename = "conceptosPorContratista")]
    pub concepts_by_contractor: Vec<ContractorBilling>,
    #[serde(rename = "pagosPorMes")]
    pub payments_by_month: Vec<MonthlyTotal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FleetStats {
    /// Whether the totals could not be computed.
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// The queries behind the fleet-wide stats, one per section so each can fail
/// on its own.
#[async_trait]
pub trait FleetStatsSource: Send + Sync {
    type Error: Display + Send;

    async fn contractor_count(&self) -> Result<u64, Self::Error>;

    /// Sum of concept totals over concepts that still have a contractor.
    async fn concept_amount_total(&self) -> Result<Decimal, Self::Error>;

    /// Sum of payments whose concept still has a contractor.
    async fn paid_total(&self) -> Result<Decimal, Self::Error>;

    async fn contractors_by_project(&self) -> Result<Vec<ProjectHeadcount>, Self::Error>;

    /// Contractors with at least one concept.
    async fn concepts_by_contractor(&self) -> Result<Vec<ContractorBilling>, Self::Error>;

    /// Payments of contractor-owned concepts made at or after `since`.
    async fn payments_since(&self, since: DateTime<Utc>)
    -> Result<Vec<PaymentPoint>, Self::Error>;
}

/// Compute the fleet-wide stats, degrading instead of failing.
///
/// A failing grouped section comes back empty. A failing total falls back to
/// the bare contractor count, and a failing count to all zeros; both carry an
/// `error` annotation.
pub async fn compute_fleet_stats<S>(source: &S, now: DateTime<Utc>) -> FleetStats
where
    S: FleetStatsSource + ?Sized,
{
    let totals = async {
        let total = source.contractor_count().await?;
        let concept_total = source.concept_amount_total().await?;
        let paid_total = source.paid_total().await?;
        Ok::<_, S::Error>((total, concept_total, paid_total))
    }
    .await;

    let (total, concept_total, paid_total) = match totals {
        Ok(totals) => totals,
        Err(e) => {
            tracing::error!("Fleet stats totals failed: {e}");
            return match source.contractor_count().await {
                Ok(total) => FleetStats {
                    total,
                    error: Some(format!("partial failure: {e}")),
                    ..FleetStats::default()
                },
                Err(inner) => {
                    tracing::error!("Fleet stats contractor count failed: {inner}");
                    FleetStats {
                        error: Some(format!("total failure: {inner}")),
                        ..FleetStats::default()
                    }
                }
            };
        }
    };

    let mut contractors_by_project =
        section("contractors by project", source.contractors_by_project().await);
    contractors_by_project.sort_by(|a, b| b.total.cmp(&a.total));

    let mut concepts_by_contractor =
        section("concepts by contractor", source.concepts_by_contractor().await);
    concepts_by_contractor.retain(|row| row.concept_count > 0);
    concepts_by_contractor.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));

    let window_start = YearMonth::of(now).minus_months(PAYMENT_WINDOW_MONTHS);
    let payments_by_month = match window_start.first_instant() {
        Some(since) => {
            let points = section("payments by month", source.payments_since(since).await);
            group_by_month(&points, since)
        }
        None => Vec::new(),
    };

    FleetStats {
        total,
        concept_total,
        paid_total,
        contractors_by_project,
        concepts_by_contractor,
        payments_by_month,
        error: None,
    }
}

fn section<T, E: Display>(name: &str, result: Result<Vec<T>, E>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(section = name, "Fleet stats section unavailable: {e}");
        Vec::new()
    })
}

/// Months with payments only, ascending.
fn group_by_month(points: &[PaymentPoint], since: DateTime<Utc>) -> Vec<MonthlyTotal> {
    let mut months: BTreeMap<YearMonth, (Decimal, usize)> = BTreeMap::new();
    for point in points.iter().filter(|p| p.paid_at >= since) {
        let bucket = months.entry(YearMonth::of(point.paid_at)).or_default();
        bucket.0 += point.amount;
        bucket.1 += 1;
    }

    months
        .into_iter()
        .map(|(month, (total, payment_count))| MonthlyTotal {
            year: month.year,
            month: month.month,
            label: month.label(),
            total,
            payment_count,
        })
        .collect()
}
