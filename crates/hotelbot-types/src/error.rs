use thiserror::Error;

/// Errors from repository operations (used by trait definitions in hotelbot-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    /// A required field was missing or malformed at write time.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// A uniqueness constraint was breached (e.g. a second click by the same
    /// session on the same recommendation).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A foreign key pointed at a row that does not exist.
    #[error("dangling reference: {0}")]
    Reference(String),
}

impl RepositoryError {
    /// Shorthand for building a [`RepositoryError::Validation`].
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RepositoryError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, RepositoryError::ConstraintViolation(_))
    }
}

/// Field-level validation failure raised by the `validate()` methods on
/// write inputs. Converts into [`RepositoryError::Validation`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl From<ValidationError> for RepositoryError {
    fn from(err: ValidationError) -> Self {
        RepositoryError::Validation {
            field: err.field.to_string(),
            reason: err.reason,
        }
    }
}
