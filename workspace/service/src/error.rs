use std::collections::BTreeMap;

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Field name → human readable messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Error types for the service layer
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Malformed, missing or inconsistent input
    #[error("Validation failed: {}", summarize(.0))]
    Validation(FieldErrors),

    /// The requested state already holds (duplicate favorite, self-subscription, ...)
    #[error("{0}")]
    Conflict(String),

    /// A referenced recipe, user, ingredient or relationship does not exist
    #[error("{0}")]
    NotFound(String),

    /// The caller may not modify the resource
    #[error("{0}")]
    Forbidden(String),
}

impl ServiceError {
    /// Builds a validation error carrying a single message for one field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        ServiceError::Validation(errors)
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            let messages = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        ServiceError::Validation(fields)
    }
}

fn summarize(fields: &FieldErrors) -> String {
    fields
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Returns true when `err` was raised by a unique or primary key constraint.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        // SQLite reports composite primary key collisions with its own extended code
        || err.to_string().contains("UNIQUE constraint failed")
}

/// Type alias for Result with ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;
