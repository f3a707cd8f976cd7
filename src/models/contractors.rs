use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{projects, specialties};
use crate::error::AppError;
use crate::storage::{StoredDocument, UploadedDocument};

pub const NAME_MAX_LEN: usize = 255;
pub const TAX_ID_MAX_LEN: usize = 13;
pub const PHONE_MAX_LEN: usize = 20;

/// SeaORM entity for the `contractors` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contractors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[serde(rename = "nombre")]
    pub name: String,
    /// Mexican RFC tax identifier.
    #[serde(rename = "rfc")]
    pub tax_id: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "especialidad_id")]
    pub specialty_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::specialties::Entity",
        from = "Column::SpecialtyId",
        to = "super::specialties::Column::Id"
    )]
    Specialty,
    #[sea_orm(has_many = "super::concepts::Entity")]
    Concepts,
    #[sea_orm(has_many = "super::contractor_projects::Entity")]
    ContractorProjects,
}

impl Related<super::specialties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Specialty.def()
    }
}

impl Related<super::concepts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Concepts.def()
    }
}

impl Related<super::contractor_projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContractorProjects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Validated contractor form, built from the multipart fields of a create or
/// update request.
#[derive(Debug, Clone)]
pub struct ContractorForm {
    pub name: String,
    pub tax_id: String,
    pub phone: String,
    pub specialty_id: Option<Uuid>,
    /// `None` when the request carried no `proyectos` field; an update then
    /// leaves the current assignments untouched.
    pub project_ids: Option<Vec<Uuid>>,
    pub documents: Vec<UploadedDocument>,
}

impl ContractorForm {
    pub fn from_fields(
        fields: &HashMap<String, String>,
        documents: Vec<UploadedDocument>,
    ) -> Result<Self, AppError> {
        let name = required_field(fields, "nombre", NAME_MAX_LEN)?;
        let tax_id = required_field(fields, "rfc", TAX_ID_MAX_LEN)?;
        let phone = required_field(fields, "telefono", PHONE_MAX_LEN)?;

        let specialty_id = match fields.get("especialidad_id").map(|v| v.trim()) {
            None | Some("") | Some("null") => None,
            Some(raw) => Some(Uuid::parse_str(raw).map_err(|_| {
                AppError::Validation(format!("especialidad_id {raw:?} is not a valid id"))
            })?),
        };

        let project_ids = match fields.get("proyectos").map(|v| v.trim()) {
            None => None,
            Some("") | Some("null") => Some(Vec::new()),
            Some(raw) => {
                let ids: Vec<Uuid> = serde_json::from_str(raw).map_err(|e| {
                    AppError::Validation(format!(
                        "proyectos must be a JSON array of project ids: {e}"
                    ))
                })?;
                let mut unique: Vec<Uuid> = Vec::with_capacity(ids.len());
                for id in ids {
                    if !unique.contains(&id) {
                        unique.push(id);
                    }
                }
                Some(unique)
            }
        };

        Ok(Self {
            name,
            tax_id,
            phone,
            specialty_id,
            project_ids,
            documents,
        })
    }
}

fn required_field(
    fields: &HashMap<String, String>,
    key: &str,
    max_len: usize,
) -> Result<String, AppError> {
    let value = fields.get(key).map(|v| v.trim()).unwrap_or_default();
    if value.is_empty() {
        return Err(AppError::Validation(format!("The {key} field is required")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "The {key} field must not exceed {max_len} characters"
        )));
    }
    Ok(value.to_string())
}

/// Contractor as returned by the CRUD endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ContractorResponse {
    #[serde(flatten)]
    pub contractor: Model,
    #[serde(rename = "especialidad")]
    pub specialty: Option<specialties::Model>,
    #[serde(rename = "proyectos")]
    pub projects: Vec<projects::Model>,
    #[serde(rename = "documentos", skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<StoredDocument>>,
}

/// Contractor header of the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ContractorWithSpecialty {
    #[serde(flatten)]
    pub contractor: Model,
    #[serde(rename = "especialidad")]
    pub specialty: Option<specialties::Model>,
}
