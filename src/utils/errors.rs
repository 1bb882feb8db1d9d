//! Sistema de manejo de errores
//!
//! Este módulo define los tipos de error que produce el motor del diario
//! de viajes y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// SQLSTATE de violación de restricción única en PostgreSQL
const PG_UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE de violación de clave foránea en PostgreSQL
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Código estable expuesto a los clientes
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Indica si el cliente puede reintentar la operación tal cual
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Timeout(_))
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db_error) => match db_error.code().as_deref() {
                Some(PG_UNIQUE_VIOLATION) => AppError::Conflict(format!(
                    "constraint {} violated",
                    db_error.constraint().unwrap_or("unique")
                )),
                Some(PG_FOREIGN_KEY_VIOLATION) => AppError::Conflict(format!(
                    "still referenced ({})",
                    db_error.constraint().unwrap_or("foreign key")
                )),
                _ => AppError::Storage(error.to_string()),
            },
            _ => AppError::Storage(error.to_string()),
        }
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: &'static str,
    retryable: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let retryable = self.is_retryable();

        let (message, details) = match self {
            AppError::Validation(errors) => (
                "The provided data is invalid".to_string(),
                Some(json!(errors)),
            ),
            AppError::Storage(msg) | AppError::Internal(msg) => {
                tracing::error!("💥 {}: {}", code, msg);
                ("An unexpected error occurred".to_string(), None)
            }
            AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::InvalidState(msg)
            | AppError::Forbidden(msg)
            | AppError::Unauthorized(msg) => (msg, None),
            AppError::Timeout(resource) => (
                format!("Timed out waiting for {}, please retry", resource),
                None,
            ),
        };

        let body = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message,
            details,
            code,
            retryable,
        };

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(resource: &str, field: &str, value: impl std::fmt::Display) -> AppError {
    AppError::Conflict(format!("{} with {} '{}' already exists", resource, field, value))
}

/// Función helper para crear errores de estado inválido
pub fn invalid_state_error(operation: &str, reason: &str) -> AppError {
    AppError::InvalidState(format!("Cannot {}: {}", operation, reason))
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_keep_distinct_status() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InvalidState("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_only_timeout_is_retryable() {
        assert!(AppError::Timeout("driver alice".into()).is_retryable());
        assert!(!AppError::Conflict("x".into()).is_retryable());
        assert!(!AppError::InvalidState("x".into()).is_retryable());
    }

    #[test]
    fn test_helpers_format_messages() {
        let error = not_found_error("Ride", 42);
        assert_eq!(error.to_string(), "Not found: Ride with id '42' not found");

        let error = conflict_error("Location", "name", "Home");
        assert!(matches!(error, AppError::Conflict(_)));
        assert_eq!(error.code(), "CONFLICT");
    }
}
