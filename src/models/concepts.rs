use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{payments, projects};
use crate::error::AppError;

pub const NAME_MAX_LEN: usize = 255;

/// SeaORM entity for the `concepts` table: a billable line item of one
/// contractor on one project.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "concepts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// `None` once the owning contractor was deleted under the orphan policy.
    #[serde(rename = "contratista_id")]
    pub contractor_id: Option<Uuid>,
    #[serde(rename = "proyecto_id")]
    pub project_id: Uuid,
    #[serde(rename = "nombre")]
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    #[serde(rename = "monto_total")]
    pub total_amount: Decimal,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contractors::Entity",
        from = "Column::ContractorId",
        to = "super::contractors::Column::Id"
    )]
    Contractor,
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Project,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::contractors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contractor.def()
    }
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Request body for creating a concept under a contractor+project pair.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateConcept {
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "monto_total")]
    pub total_amount: Option<Decimal>,
    /// Down payment recorded together with the concept.
    #[serde(rename = "anticipo", default)]
    pub advance: Option<Decimal>,
}

impl CreateConcept {
    pub fn validate(&self) -> Result<(), AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("The nombre field is required".into()));
        }
        if name.chars().count() > NAME_MAX_LEN {
            return Err(AppError::Validation(format!(
                "The nombre field must not exceed {NAME_MAX_LEN} characters"
            )));
        }
        match self.total_amount {
            None => {
                return Err(AppError::Validation(
                    "The monto_total field is required".into(),
                ));
            }
            Some(total) if total < Decimal::ZERO => {
                return Err(AppError::Validation(
                    "The monto_total field must be at least 0".into(),
                ));
            }
            _ => {}
        }
        if self.advance.is_some_and(|advance| advance < Decimal::ZERO) {
            return Err(AppError::Validation(
                "The anticipo field must be at least 0".into(),
            ));
        }
        Ok(())
    }

    /// The advance to record, if any. Zero advances create no payment.
    pub fn positive_advance(&self) -> Option<Decimal> {
        self.advance.filter(|a| *a > Decimal::ZERO)
    }
}

/// A concept together with its eager-loaded project and payments.
#[derive(Debug, Clone, Serialize)]
pub struct ConceptDetails {
    #[serde(flatten)]
    pub concept: Model,
    #[serde(rename = "proyecto", skip_serializing_if = "Option::is_none")]
    pub project: Option<projects::Model>,
    #[serde(rename = "pagos")]
    pub payments: Vec<payments::Model>,
}
