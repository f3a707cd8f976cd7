use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use sea_orm::DbErr;
use thiserror::Error;

/// Failures surfaced by the contractor services.
///
/// Every variant maps to one HTTP status; handlers render it either in the
/// legacy `{error}` body or in the `{success: false, message}` envelope.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    /// The contractor is not linked to the project being operated on.
    #[error("{0}")]
    AssignmentViolation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{context}: {source}")]
    Aggregation {
        context: String,
        #[source]
        source: DbErr,
    },

    #[error("transaction failed: {0}")]
    Transaction(#[source] DbErr),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl AppError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("{entity} {id} not found"))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::AssignmentViolation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Aggregation { .. }
            | AppError::Transaction(_)
            | AppError::Database(_)
            | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `{"error": "..."}` body used by the contractor CRUD endpoints.
    pub fn legacy_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
        }))
    }

    /// `{"success": false, "message": "..."}` body used by the concept and
    /// dashboard endpoints.
    pub fn envelope_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "message": self.to_string(),
        }))
    }
}
