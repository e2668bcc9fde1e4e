//! Deal-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | Forbidden | 403 |
//! | InvalidState | 409 |
//! | HasCodes | 409 |
//! | NotRedeemable | 422 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DealId, DomainError, ErrorCode, SalonId, ValidationError};

/// Deal lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DealError {
    /// Deal was not found.
    NotFound(DealId),

    /// Caller may not act on this deal.
    Forbidden { salon_id: SalonId, deal_id: DealId },

    /// Requested approval transition is not allowed.
    InvalidState { current: String, attempted: String },

    /// Deal still has discount codes and cannot be deleted.
    HasCodes(DealId),

    /// Deal is inactive, unapproved or does not use discount codes.
    NotRedeemable(DealId),

    /// Validation failed.
    ValidationFailed { field: String, message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl DealError {
    pub fn not_found(id: DealId) -> Self {
        DealError::NotFound(id)
    }

    pub fn forbidden(salon_id: SalonId, deal_id: DealId) -> Self {
        DealError::Forbidden { salon_id, deal_id }
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        DealError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn has_codes(id: DealId) -> Self {
        DealError::HasCodes(id)
    }

    pub fn not_redeemable(id: DealId) -> Self {
        DealError::NotRedeemable(id)
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DealError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        DealError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DealError::NotFound(_) => ErrorCode::DealNotFound,
            DealError::Forbidden { .. } => ErrorCode::Forbidden,
            DealError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            DealError::HasCodes(_) => ErrorCode::DealHasCodes,
            DealError::NotRedeemable(_) => ErrorCode::ValidationFailed,
            DealError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            DealError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            DealError::NotFound(id) => format!("Deal not found: {}", id),
            DealError::Forbidden { salon_id, deal_id } => {
                format!("Salon {} may not manage deal {}", salon_id, deal_id)
            }
            DealError::InvalidState { current, attempted } => {
                format!("Cannot {} a deal that is {}", attempted, current)
            }
            DealError::HasCodes(id) => {
                format!("Deal {} has discount codes and cannot be deleted", id)
            }
            DealError::NotRedeemable(_) => "Erbjudandet går inte att lösa in just nu".to_string(),
            DealError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            DealError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for DealError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for DealError {}

impl From<DomainError> for DealError {
    fn from(err: DomainError) -> Self {
        DealError::Infrastructure(err.to_string())
    }
}

impl From<ValidationError> for DealError {
    fn from(err: ValidationError) -> Self {
        DealError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}
