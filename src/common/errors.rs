use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use std::fmt;

/// Infrastructure fault raised by the storage layer.
///
/// Every domain outcome (not found, forbidden, already exists, ...) is returned
/// as a typed value by the services; only connection losses, constraint
/// violations and other database errors travel as a `StorageFailure`. The
/// session that produced it has always been rolled back.
#[derive(Debug)]
pub struct StorageFailure {
    source: DbErr,
}

impl StorageFailure {
    /// Whether the database rejected a write because of a unique or primary key constraint.
    pub fn is_unique_violation(&self) -> bool {
        if let Some(SqlErr::UniqueConstraintViolation(_)) = self.source.sql_err() {
            return true;
        }
        let message = self.source.to_string();
        message.contains("UNIQUE constraint") || message.contains("duplicate key")
    }

    pub fn db_err(&self) -> &DbErr {
        &self.source
    }
}

impl From<DbErr> for StorageFailure {
    fn from(source: DbErr) -> Self {
        Self { source }
    }
}

impl fmt::Display for StorageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "storage failure: {}", self.source)
    }
}

impl std::error::Error for StorageFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Error types surfaced at the HTTP boundary
#[derive(Debug, Clone)]
pub enum BusinessError {
    /// Missing field or invalid value (422 Unprocessable Entity)
    ValidationError { field: String, message: String },
    /// No or unknown credential (401 Unauthorized)
    Unauthenticated,
    /// Username or password rejected at login (400 Bad Request)
    InvalidCredentials,
    /// Authenticated but not the owner (403 Forbidden)
    Forbidden { action: String, resource: String },
    /// Resource not found (404 Not Found)
    NotFound { resource: String, id: String },
    /// Uniqueness conflict (409 Conflict)
    Duplicate { resource: String, field: String },
    /// Storage layer failure (500 Internal Server Error)
    StorageFailure { message: String },
}

impl fmt::Display for BusinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusinessError::ValidationError { field, message } => {
                write!(f, "Validation error in field '{field}': {message}")
            }
            BusinessError::Unauthenticated => {
                write!(f, "Unauthorized access - request denied")
            }
            BusinessError::InvalidCredentials => {
                write!(f, "Incorrect username or password")
            }
            BusinessError::Forbidden { action, resource } => {
                write!(f, "Not authorized to {action} {resource}")
            }
            BusinessError::NotFound { resource, id } => {
                write!(f, "{resource} with id '{id}' not found")
            }
            BusinessError::Duplicate { resource, field } => {
                write!(f, "{resource} with this {field} already exists")
            }
            BusinessError::StorageFailure { message } => {
                write!(f, "Storage failure: {message}")
            }
        }
    }
}

impl std::error::Error for BusinessError {}

impl BusinessError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            BusinessError::ValidationError { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
            }
            BusinessError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            BusinessError::InvalidCredentials => (StatusCode::BAD_REQUEST, "INVALID_CREDENTIALS"),
            BusinessError::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            BusinessError::NotFound { .. } => (StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND"),
            BusinessError::Duplicate { .. } => (StatusCode::CONFLICT, "DUPLICATE_RESOURCE"),
            BusinessError::StorageFailure { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_FAILURE")
            }
        }
    }
}

/// Convert `BusinessError` to HTTP responses
impl IntoResponse for BusinessError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
                "type": format!("{self:?}").split([' ', '{']).next().unwrap_or("Unknown")
            }
        }));

        (status, body).into_response()
    }
}

impl From<StorageFailure> for BusinessError {
    fn from(failure: StorageFailure) -> Self {
        tracing::error!("{failure}");
        BusinessError::StorageFailure {
            message: failure.db_err().to_string(),
        }
    }
}

/// Convenience macros for creating business errors
#[macro_export]
macro_rules! validation_error {
    ($field:expr, $message:expr) => {
        $crate::common::errors::BusinessError::ValidationError {
            field: $field.to_string(),
            message: $message.to_string(),
        }
    };
}

#[macro_export]
macro_rules! not_found {
    ($resource:expr, $id:expr) => {
        $crate::common::errors::BusinessError::NotFound {
            resource: $resource.to_string(),
            id: $id.to_string(),
        }
    };
}

#[macro_export]
macro_rules! duplicate_resource {
    ($resource:expr, $field:expr) => {
        $crate::common::errors::BusinessError::Duplicate {
            resource: $resource.to_string(),
            field: $field.to_string(),
        }
    };
}

#[macro_export]
macro_rules! forbidden {
    ($action:expr, $resource:expr) => {
        $crate::common::errors::BusinessError::Forbidden {
            action: $action.to_string(),
            resource: $resource.to_string(),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_creation() {
        let err = validation_error!("battery_percentage", "is required");
        assert!(matches!(err, BusinessError::ValidationError { .. }));
        assert_eq!(
            err.to_string(),
            "Validation error in field 'battery_percentage': is required"
        );
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (BusinessError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (BusinessError::InvalidCredentials, StatusCode::BAD_REQUEST),
            (forbidden!("delete", "station 1"), StatusCode::FORBIDDEN),
            (not_found!("station", 7), StatusCode::NOT_FOUND),
            (duplicate_resource!("station", "coordinates"), StatusCode::CONFLICT),
            (
                validation_error!("battery_percentage", "is required"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                BusinessError::StorageFailure {
                    message: "connection reset".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_storage_failure_detects_unique_violation_from_message() {
        let failure = StorageFailure::from(DbErr::Custom(
            "UNIQUE constraint failed: stations.longitude, stations.latitude".to_string(),
        ));
        assert!(failure.is_unique_violation());

        let failure = StorageFailure::from(DbErr::Custom("connection reset".to_string()));
        assert!(!failure.is_unique_violation());
    }

    #[test]
    fn test_storage_failure_converts_to_business_error() {
        let failure = StorageFailure::from(DbErr::Custom("boom".to_string()));
        let business_err: BusinessError = failure.into();
        assert!(matches!(business_err, BusinessError::StorageFailure { .. }));
    }
}
