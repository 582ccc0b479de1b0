//! Error types and handling.

use thiserror::Error;

use crate::db::PersistenceError;
use crate::validation::ValidationErrors;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Input failed field-level validation or could not be read at all
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// Requested record does not exist
    #[error("Not found: {entity} {id}")]
    NotFound { entity: &'static str, id: i32 },

    /// Store rejected or failed an operation
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create a not found error for an entity id
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Persistence(PersistenceError::Database(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_not_found_message() {
        let err = AppError::not_found("Department", 999);
        assert_eq!(err.to_string(), "Not found: Department 999");
    }

    #[test]
    fn test_timeout_message() {
        let err = AppError::from(PersistenceError::Timeout(Duration::from_secs(30)));
        assert_eq!(err.to_string(), "Persistence error: Store operation timed out after 30s");
    }
}
