use actix_multipart::Multipart;
use futures_util::StreamExt;
use std::collections::HashMap;

use crate::config::UploadLimits;
use crate::error::AppError;
use crate::models::contractors::ContractorForm;
use crate::storage::UploadedDocument;

const DOCUMENTS_FIELD: &str = "documentos";
const PROJECTS_FIELD: &str = "proyectos";

fn invalid_body(e: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {e}"))
}

/// Drain a multipart contractor form.
///
/// Files under `documentos`/`documentos[]` become uploads. Projects may come
/// either as one JSON array in `proyectos` or as repeated `proyectos[]` fields.
/// Reading stops with a validation error as soon as a part or the whole form
/// grows past `limits`.
pub async fn read_contractor_form(
    mut payload: Multipart,
    limits: UploadLimits,
) -> Result<ContractorForm, AppError> {
    let mut form_bytes = 0usize;
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut project_items: Vec<String> = Vec::new();
    let mut documents = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(invalid_body)?;
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(invalid_body)?;
            form_bytes += chunk.len();
            if bytes.len() + chunk.len() > limits.max_part_bytes {
                return Err(AppError::Validation(format!(
                    "The {name} field must not exceed {} bytes",
                    limits.max_part_bytes
                )));
            }
            if form_bytes > limits.max_form_bytes {
                return Err(AppError::Validation(format!(
                    "The form must not exceed {} bytes",
                    limits.max_form_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        if name.starts_with(DOCUMENTS_FIELD) {
            // Empty file inputs still submit a part with no file name.
            if let Some(file_name) = file_name.filter(|f| !f.is_empty()) {
                documents.push(UploadedDocument { file_name, bytes });
            }
            continue;
        }

        let value = String::from_utf8(bytes).map_err(invalid_body)?;
        if name.starts_with("proyectos[") {
            project_items.push(value.trim().to_string());
        } else {
            fields.insert(name, value);
        }
    }

    if !project_items.is_empty() && !fields.contains_key(PROJECTS_FIELD) {
        let joined = serde_json::to_string(&project_items).map_err(invalid_body)?;
        fields.insert(PROJECTS_FIELD.to_string(), joined);
    }

    ContractorForm::from_fields(&fields, documents)
}
