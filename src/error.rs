// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::password::PasswordError;
use crate::auth::AuthError;
use crate::database::{DatabaseError, RecordError};

pub const SERVER_ERROR: &str = "Server error";
pub const TOKEN_MISSING: &str = "No token, authorization denied.";
pub const TOKEN_INVALID: &str = "Token is not valid.";
pub const ADMINS_ONLY: &str = "Access denied. Admins only.";

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // Uniqueness rules; reported as 400 like the rest of the input errors
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 400,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError {
                message,
                field_errors: Some(field_errors),
            } => json!({
                "message": message,
                "fieldErrors": field_errors,
            }),
            _ => json!({ "message": self.message() }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Option<HashMap<String, String>>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::MissingRequiredFields(fields) => {
                let message = missing_fields_message(&fields);
                let field_errors = fields
                    .into_iter()
                    .map(|field| (field, "This field is required".to_string()))
                    .collect();
                ApiError::validation_error(message, Some(field_errors))
            }
            RecordError::InvalidField { field, reason } => {
                let mut field_errors = HashMap::new();
                field_errors.insert(field.clone(), reason);
                ApiError::validation_error(format!("Invalid value for field '{}'", field), Some(field_errors))
            }
            RecordError::InvalidId(raw) => ApiError::bad_request(format!("Invalid id '{}'", raw)),
        }
    }
}

fn missing_fields_message(fields: &[String]) -> String {
    if fields.is_empty() {
        "All fields are required.".to_string()
    } else {
        format!("All fields are required. Missing: {}", fields.join(", "))
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Conflict(msg) => ApiError::conflict(msg),
            DatabaseError::UniqueViolation(constraint) => {
                tracing::warn!("Unique constraint {} violated", constraint);
                ApiError::conflict("Record already exists.")
            }
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut) | DatabaseError::Sqlx(sqlx::Error::Io(_)) => {
                tracing::error!("Database unreachable: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            other => {
                // Don't expose internal store errors to clients
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error(SERVER_ERROR)
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Expired | AuthError::InvalidToken(_) => {
                tracing::debug!("Rejected token: {}", err);
                ApiError::unauthorized(TOKEN_INVALID)
            }
            AuthError::InvalidSecret | AuthError::TokenGeneration(_) => {
                tracing::error!("Token service error: {}", err);
                ApiError::internal_server_error(SERVER_ERROR)
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!("Password hashing error: {}", err);
        ApiError::internal_server_error(SERVER_ERROR)
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match status.as_u16() {
            500.. => tracing::error!(status = status.as_u16(), "{}", self.message()),
            401 | 403 => tracing::warn!(status = status.as_u16(), "{}", self.message()),
            _ => tracing::debug!(status = status.as_u16(), "{}", self.message()),
        }
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_are_bad_requests() {
        let err: ApiError = DatabaseError::Conflict("User already exists.".into()).into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_json(), json!({"message": "User already exists."}));
    }

    #[test]
    fn missing_fields_are_listed() {
        let err: ApiError = RecordError::MissingRequiredFields(vec!["name".into()]).into();
        assert_eq!(err.status_code(), 400);
        let body = err.to_json();
        assert_eq!(body["message"], "All fields are required. Missing: name");
        assert_eq!(body["fieldErrors"]["name"], "This field is required");
    }

    #[test]
    fn store_internals_are_hidden() {
        let err: ApiError = DatabaseError::Decode("column data is not an object".into()).into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), SERVER_ERROR);
    }

    #[test]
    fn bad_tokens_are_unauthorized() {
        let err: ApiError = AuthError::Expired.into();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), TOKEN_INVALID);
    }
}
