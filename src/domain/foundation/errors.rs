//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // Not found errors
    DealNotFound,
    SalonNotFound,
    CodeNotFound,

    // State errors
    InvalidStateTransition,
    CodeAlreadyUsed,
    CodesExhausted,
    ContactAlreadyUsed,
    DealHasCodes,
    DuplicateCode,
    GenerationInProgress,

    // Authorization errors
    Unauthorized,
    Forbidden,

    // External side effects
    PaymentFailed,
    NotificationFailed,

    // Infrastructure errors
    DatabaseError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::DealNotFound => "DEAL_NOT_FOUND",
            ErrorCode::SalonNotFound => "SALON_NOT_FOUND",
            ErrorCode::CodeNotFound => "CODE_NOT_FOUND",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::CodeAlreadyUsed => "CODE_ALREADY_USED",
            ErrorCode::CodesExhausted => "CODES_EXHAUSTED",
            ErrorCode::ContactAlreadyUsed => "CONTACT_ALREADY_USED",
            ErrorCode::DealHasCodes => "DEAL_HAS_CODES",
            ErrorCode::DuplicateCode => "DUPLICATE_CODE",
            ErrorCode::GenerationInProgress => "GENERATION_IN_PROGRESS",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::PaymentFailed => "PAYMENT_FAILED",
            ErrorCode::NotificationFailed => "NOTIFICATION_FAILED",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
///
/// Returned by port implementations; the application layer folds it into
/// the area-specific error enums.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("name");
        assert_eq!(format!("{}", err), "Field 'name' cannot be empty");
    }

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("quantity", 1, 500, 501);
        assert_eq!(
            format!("{}", err),
            "Field 'quantity' must be between 1 and 500, got 501"
        );
        assert_eq!(err.field(), "quantity");
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::DealNotFound, "Deal not found");
        assert_eq!(format!("{}", err), "[DEAL_NOT_FOUND] Deal not found");
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::database("insert failed").with_detail("table", "discount_codes");

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.details.get("table"), Some(&"discount_codes".to_string()));
    }
}
