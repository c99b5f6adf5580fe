//! Centralized error handling.
//!
//! Every repository and unit-of-work operation reports failures through
//! [`AppError`]. Engine-specific errors are translated into a stable, named
//! failure kind so the HTTP layer can map them without knowing SeaORM.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Query outcomes
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} matched more than one row")]
    MultipleResults(String),

    #[error("Unknown relation '{relation}' for {entity}")]
    InvalidInclude {
        entity: &'static str,
        relation: String,
    },

    // Write outcomes
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("{0}")]
    Validation(String),

    // Lifecycle
    #[error("Operation cancelled")]
    Cancelled,

    // External service errors
    #[error("Database error")]
    Database(DbErr),

    // Internal
    #[error("Internal error")]
    Internal(String),
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::MultipleResults(_) => "MULTIPLE_RESULTS",
            AppError::InvalidInclude { .. } => "INVALID_INCLUDE",
            AppError::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Cancelled => "CANCELLED",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::ConstraintViolation(_) => 409,
            AppError::Validation(_) | AppError::InvalidInclude { .. } => 400,
            AppError::Cancelled => 499,
            AppError::MultipleResults(_) | AppError::Database(_) | AppError::Internal(_) => 500,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            AppError::MultipleResults(entity) => {
                tracing::error!("Ambiguous single-result query on {}", entity);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg))
            | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                return AppError::ConstraintViolation(msg);
            }
            _ => {}
        }

        match err {
            DbErr::RecordNotFound(what) => AppError::NotFound(what),
            DbErr::RecordNotUpdated => AppError::NotFound("Record".to_string()),
            other => AppError::Database(other),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(format_validation_errors(&errors))
    }
}

/// Format validation errors into a user-friendly string
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>();
    messages.sort();
    messages.join(", ")
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::not_found(entity))
    }
}

/// Convenience constructors
impl AppError {
    pub fn not_found(entity: impl Into<String>) -> Self {
        AppError::NotFound(entity.into())
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        AppError::ConstraintViolation(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn invalid_include(entity: &'static str, relation: impl Into<String>) -> Self {
        AppError::InvalidInclude {
            entity,
            relation: relation.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
