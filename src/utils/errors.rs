//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del servidor
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl AppError {
    /// Código HTTP asociado al error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Migration(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Cuerpo JSON de la respuesta de error
    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            AppError::Database(e) => ErrorResponse {
                error: "Database Error".to_string(),
                message: "An error occurred while accessing the database".to_string(),
                details: Some(json!({ "sql_error": e.to_string() })),
                code: Some("DB_ERROR".to_string()),
            },
            AppError::Migration(e) => ErrorResponse {
                error: "Database Error".to_string(),
                message: "Database migrations failed".to_string(),
                details: Some(json!({ "migration_error": e.to_string() })),
                code: Some("DB_ERROR".to_string()),
            },
            AppError::Validation(e) => ErrorResponse {
                error: "Validation Error".to_string(),
                message: validation_message(e),
                details: Some(json!(e)),
                code: Some("VALIDATION_ERROR".to_string()),
            },
            AppError::NotFound(msg) => ErrorResponse {
                error: "Not Found".to_string(),
                message: msg.clone(),
                details: None,
                code: Some("NOT_FOUND".to_string()),
            },
            AppError::Conflict(msg) => ErrorResponse {
                error: "Conflict".to_string(),
                message: msg.clone(),
                details: None,
                code: Some("CONFLICT".to_string()),
            },
            AppError::BadRequest(msg) => ErrorResponse {
                error: "Bad Request".to_string(),
                message: msg.clone(),
                details: None,
                code: Some("BAD_REQUEST".to_string()),
            },
            AppError::Internal(msg) => ErrorResponse {
                error: "Internal Server Error".to_string(),
                message: "An unexpected error occurred".to_string(),
                details: Some(json!({ "internal_error": msg })),
                code: Some("INTERNAL_ERROR".to_string()),
            },
            AppError::ServiceUnavailable(msg) => ErrorResponse {
                error: "Service Unavailable".to_string(),
                message: msg.clone(),
                details: None,
                code: Some("SERVICE_UNAVAILABLE".to_string()),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("❌ {}", self);
        } else {
            tracing::warn!("⚠️ {}", self);
        }

        (status, Json(self.to_error_response())).into_response()
    }
}

/// Primer mensaje legible de un conjunto de errores de validación
fn validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .min()
        .unwrap_or_else(|| "The provided data is invalid".to_string())
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación
pub fn validation_error(field: &'static str, message: &'static str) -> AppError {
    use validator::ValidationError;

    let mut error = ValidationError::new("custom");
    error.message = Some(message.into());

    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);

    AppError::Validation(errors)
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: i32) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para referencias a filas inexistentes en escrituras
pub fn unknown_reference_error(resource: &str, id: i32) -> AppError {
    AppError::BadRequest(format!("{} with id '{}' does not exist", resource, id))
}

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(not_found_error("Driver", 3).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(bad_request_error("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Conflict("busy".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_validation_error_keeps_message() {
        let err = validation_error("first_name", "first_name is required");
        let body = err.to_error_response();
        assert_eq!(body.message, "first_name is required");
        assert_eq!(body.code.as_deref(), Some("VALIDATION_ERROR"));
    }
}
