use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use super::progress::{YearMonth, progress_pct};

/// Most recent payments kept in the feed.
pub const RECENT_PAYMENTS_LIMIT: usize = 10;
/// Calendar months covered by the histogram, current month included.
pub const HISTOGRAM_MONTHS: u32 = 6;

// ── Input records ──

/// The project a concept belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRef {
    pub id: Uuid,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "estado")]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
    pub description: Option<String>,
    pub is_advance: bool,
}

/// One concept with its project and every payment made against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptRecord {
    pub id: Uuid,
    pub name: String,
    pub total_amount: Decimal,
    pub project: ProjectRef,
    pub payments: Vec<PaymentRecord>,
}

impl ConceptRecord {
    pub fn paid(&self) -> Decimal {
        self.payments.iter().map(|p| p.amount).sum()
    }
}

// ── Output ──

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractorDashboard<C> {
    #[serde(rename = "contratista")]
    pub contractor: C,
    #[serde(rename = "resumen")]
    pub summary: DashboardSummary,
    #[serde(rename = "estadisticas_por_proyecto")]
    pub projects: Vec<ProjectProgress>,
    #[serde(rename = "conceptos_con_avance")]
    pub concepts: Vec<ConceptProgress>,
    #[serde(rename = "pagos_recientes")]
    pub recent_payments: Vec<RecentPayment>,
    #[serde(rename = "pagos_por_mes")]
    pub payments_by_month: Vec<MonthlyPayments>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    #[serde(rename = "total_proyectos")]
    pub project_count: usize,
    #[serde(rename = "total_conceptos")]
    pub concept_count: usize,
    #[serde(rename = "monto_total_conceptos")]
    pub total_amount: Decimal,
    #[serde(rename = "total_pagado")]
    pub paid: Decimal,
    #[serde(rename = "saldo_pendiente")]
    pub pending: Decimal,
    #[serde(rename = "porcentaje_avance_general")]
    pub progress: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectProgress {
    #[serde(rename = "proyecto")]
    pub project: ProjectRef,
    #[serde(rename = "total_conceptos")]
    pub concept_count: usize,
    #[serde(rename = "monto_total")]
    pub total_amount: Decimal,
    #[serde(rename = "pagado")]
    pub paid: Decimal,
    #[serde(rename = "pendiente")]
    pub pending: Decimal,
    #[serde(rename = "porcentaje_avance")]
    pub progress: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConceptProgress {
    pub id: Uuid,
    #[serde(rename = "nombre")]
    pub name: String,
    /// Project name.
    #[serde(rename = "proyecto")]
    pub project: String,
    #[serde(rename = "monto_total")]
    pub total_amount: Decimal,
    #[serde(rename = "pagado")]
    pub paid: Decimal,
    #[serde(rename = "pendiente")]
    pub pending: Decimal,
    #[serde(rename = "porcentaje_avance")]
    pub progress: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedRef {
    pub id: Uuid,
    #[serde(rename = "nombre")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentPayment {
    pub id: Uuid,
    #[serde(rename = "monto")]
    pub amount: Decimal,
    #[serde(rename = "fecha")]
    pub paid_at: DateTime<Utc>,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "es_anticipo")]
    pub is_advance: bool,
    #[serde(rename = "concepto")]
    pub concept: NamedRef,
    #[serde(rename = "proyecto")]
    pub project: NamedRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyPayments {
    /// "Oct 2026".
    #[serde(rename = "mes")]
    pub label: String,
    #[serde(rename = "anio")]
    pub year: i32,
    #[serde(rename = "numero_mes")]
    pub month: u32,
    pub total: Decimal,
    #[serde(rename = "cantidad_pagos")]
    pub payment_count: usize,
}

/// Running totals for one aggregation unit.
#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    concepts: usize,
    total: Decimal,
    paid: Decimal,
}

impl Tally {
    fn add(&mut self, total: Decimal, paid: Decimal) {
        self.concepts += 1;
        self.total += total;
        self.paid += paid;
    }

    fn pending(&self) -> Decimal {
        self.total - self.paid
    }

    fn progress(&self) -> Decimal {
        progress_pct(self.paid, self.total)
    }
}

/// Fold a contractor's concepts into the dashboard payload.
///
/// `contractor` is passed through untouched as the `contratista` header.
pub fn build_dashboard<C>(
    contractor: C,
    concepts: &[ConceptRecord],
    now: DateTime<Utc>,
) -> ContractorDashboard<C> {
    let mut overall = Tally::default();
    let mut project_order: Vec<&ProjectRef> = Vec::new();
    let mut per_project: HashMap<Uuid, Tally> = HashMap::new();
    let mut concept_rows = Vec::with_capacity(concepts.len());

    for concept in concepts {
        let paid = concept.paid();
        overall.add(concept.total_amount, paid);

        per_project
            .entry(concept.project.id)
            .or_insert_with(|| {
                project_order.push(&concept.project);
                Tally::default()
            })
            .add(concept.total_amount, paid);

        concept_rows.push(ConceptProgress {
            id: concept.id,
            name: concept.name.clone(),
            project: concept.project.name.clone(),
            total_amount: concept.total_amount,
            paid,
            pending: concept.total_amount - paid,
            progress: progress_pct(paid, concept.total_amount),
        });
    }

    let projects: Vec<ProjectProgress> = project_order
        .into_iter()
        .map(|project| {
            let tally = per_project.get(&project.id).copied().unwrap_or_default();
            ProjectProgress {
                project: project.clone(),
                concept_count: tally.concepts,
                total_amount: tally.total,
                paid: tally.paid,
                pending: tally.pending(),
                progress: tally.progress(),
            }
        })
        .collect();

    // Stable: equal progress keeps load order.
    concept_rows.sort_by(|a, b| b.progress.cmp(&a.progress));

    ContractorDashboard {
        contractor,
        summary: DashboardSummary {
            project_count: projects.len(),
            concept_count: overall.concepts,
            total_amount: overall.total,
            paid: overall.paid,
            pending: overall.pending(),
            progress: overall.progress(),
        },
        projects,
        concepts: concept_rows,
        recent_payments: recent_payments(concepts),
        payments_by_month: payments_by_month(concepts, now),
    }
}

fn recent_payments(concepts: &[ConceptRecord]) -> Vec<RecentPayment> {
    let mut feed: Vec<RecentPayment> = concepts
        .iter()
        .flat_map(|concept| {
            concept.payments.iter().map(move |payment| RecentPayment {
                id: payment.id,
                amount: payment.amount,
                paid_at: payment.paid_at,
                description: payment.description.clone(),
                is_advance: payment.is_advance,
                concept: NamedRef {
                    id: concept.id,
                    name: concept.name.clone(),
                },
                project: NamedRef {
                    id: concept.project.id,
                    name: concept.project.name.clone(),
                },
            })
        })
        .collect();

    feed.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
    feed.truncate(RECENT_PAYMENTS_LIMIT);
    feed
}

fn payments_by_month(concepts: &[ConceptRecord], now: DateTime<Utc>) -> Vec<MonthlyPayments> {
    let mut buckets: HashMap<YearMonth, (Decimal, usize)> = HashMap::new();
    for payment in concepts.iter().flat_map(|c| &c.payments) {
        let bucket = buckets.entry(YearMonth::of(payment.paid_at)).or_default();
        bucket.0 += payment.amount;
        bucket.1 += 1;
    }

    YearMonth::trailing(now, HISTOGRAM_MONTHS)
        .into_iter()
        .map(|month| {
            let (total, payment_count) = buckets.get(&month).copied().unwrap_or_default();
            MonthlyPayments {
                label: month.label(),
                year: month.year,
                month: month.month,
                total,
                payment_count,
            }
        })
        .collect()
}
