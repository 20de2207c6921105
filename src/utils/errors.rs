//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Business rule violated: {0}")]
    BusinessRule(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),
}

impl AppError {
    /// Código HTTP asociado a cada clase de error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::BusinessRule(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) | AppError::Hash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Código estable que consume el frontend
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DB_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::Jwt(_) => "JWT_ERROR",
            AppError::Hash(_) => "HASH_ERROR",
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
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let (error, message, details) = match self {
            AppError::Database(e) => {
                error!("Database error: {}", e);
                (
                    "Database Error",
                    "An error occurred while accessing the database".to_string(),
                    None,
                )
            }
            AppError::Validation(e) => {
                warn!("Validation error: {}", e);
                (
                    "Validation Error",
                    "The provided data is invalid".to_string(),
                    Some(json!(e)),
                )
            }
            AppError::BadRequest(msg) => {
                warn!("Bad request: {}", msg);
                ("Bad Request", msg, None)
            }
            AppError::Unauthorized(msg) => {
                warn!("Unauthorized access: {}", msg);
                ("Unauthorized", msg, None)
            }
            AppError::Forbidden(msg) => {
                warn!("Forbidden access: {}", msg);
                ("Forbidden", msg, None)
            }
            AppError::NotFound(msg) => {
                warn!("Resource not found: {}", msg);
                ("Not Found", msg, None)
            }
            AppError::Conflict(msg) => {
                warn!("Conflict: {}", msg);
                ("Conflict", msg, None)
            }
            AppError::BusinessRule(msg) => {
                warn!("Business rule violated: {}", msg);
                ("Business Rule Violation", msg, None)
            }
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    "Internal Server Error",
                    "An unexpected error occurred".to_string(),
                    None,
                )
            }
            AppError::Jwt(msg) => {
                warn!("JWT error: {}", msg);
                ("JWT Error", msg, None)
            }
            AppError::Hash(msg) => {
                error!("Hash error: {}", msg);
                (
                    "Hash Error",
                    "An error occurred while processing credentials".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            message,
            details,
            code,
        };

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Traduce un error de SQLx, convirtiendo las violaciones de unicidad en `Conflict`.
pub fn map_db_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return unique_violation_error(db_err.constraint());
        }
    }
    AppError::Database(err)
}

/// Mensaje de conflicto según la restricción violada
pub fn unique_violation_error(constraint: Option<&str>) -> AppError {
    let message = match constraint {
        Some("cars_license_plate_key") => "La patente ya está registrada",
        Some("clients_dni_key") => "Ya existe un cliente con ese DNI",
        Some("clients_phone_key") => "Ya existe un cliente con ese teléfono",
        Some("users_email_key") => "El email ya está registrado",
        _ => "El registro ya existe",
    };
    AppError::Conflict(message.to_string())
}

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
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} no encontrado con {}", resource, id))
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::Conflict(format!("Ya existe un {} con {}: {}", resource, field, value))
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(reason: &str) -> AppError {
    AppError::Forbidden(reason.to_string())
}

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}

/// Función helper para crear errores internos
pub fn internal_error(message: &str) -> AppError {
    AppError::Internal(message.to_string())
}
