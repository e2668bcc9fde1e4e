//! Code lifecycle error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ValidationFailed | 400 |
//! | ContactRejected (format) | 400 |
//! | ContactRejected (already used) | 409 |
//! | AlreadyUsed | 409 |
//! | GenerationInProgress | 409 |
//! | DealNotFound | 404 |
//! | CodeNotFound | 404 |
//! | Forbidden | 403 |
//! | AdminOnly | 403 |
//! | PoolExhausted | 410 |
//! | DealNotRedeemable | 422 |
//! | NotificationFailed | 502 |
//! | PaymentFailed | 502 |
//! | PartialGeneration | 500 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DealId, DomainError, ErrorCode, SalonId, ValidationError};
use crate::domain::redemption::ContactRejection;

/// Errors from generating, allocating and redeeming discount codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    /// Input failed validation.
    ValidationFailed { field: String, message: String },

    /// Customer contact details were refused.
    ContactRejected(ContactRejection),

    /// Deal does not exist.
    DealNotFound(DealId),

    /// Caller may not manage codes of this deal.
    Forbidden { salon_id: SalonId, deal_id: DealId },

    /// Operation is reserved for administrators.
    AdminOnly(SalonId),

    /// Deal is inactive, unapproved or not in discount-code mode.
    DealNotRedeemable(DealId),

    /// Code does not exist.
    CodeNotFound(String),

    /// Code was already consumed.
    AlreadyUsed(String),

    /// Deal has no unused codes left.
    PoolExhausted(DealId),

    /// Another run is filling this deal's pool right now.
    GenerationInProgress(DealId),

    /// A generation batch failed after some codes were stored; `inserted`
    /// counts the whole pool so far.
    PartialGeneration { inserted: u32, requested: u32 },

    /// Code was consumed but the email could not be delivered.
    NotificationFailed { code: String },

    /// Payment provider rejected the checkout.
    PaymentFailed(String),

    /// Infrastructure error.
    Infrastructure(String),
}

impl CodeError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CodeError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn deal_not_found(id: DealId) -> Self {
        CodeError::DealNotFound(id)
    }

    pub fn forbidden(salon_id: SalonId, deal_id: DealId) -> Self {
        CodeError::Forbidden { salon_id, deal_id }
    }

    pub fn admin_only(salon_id: SalonId) -> Self {
        CodeError::AdminOnly(salon_id)
    }

    pub fn not_redeemable(id: DealId) -> Self {
        CodeError::DealNotRedeemable(id)
    }

    pub fn code_not_found(code: impl Into<String>) -> Self {
        CodeError::CodeNotFound(code.into())
    }

    pub fn already_used(code: impl Into<String>) -> Self {
        CodeError::AlreadyUsed(code.into())
    }

    pub fn exhausted(id: DealId) -> Self {
        CodeError::PoolExhausted(id)
    }

    pub fn generation_in_progress(id: DealId) -> Self {
        CodeError::GenerationInProgress(id)
    }

    pub fn partial_generation(inserted: u32, requested: u32) -> Self {
        CodeError::PartialGeneration {
            inserted,
            requested,
        }
    }

    pub fn notification_failed(code: impl Into<String>) -> Self {
        CodeError::NotificationFailed { code: code.into() }
    }

    pub fn payment_failed(reason: impl Into<String>) -> Self {
        CodeError::PaymentFailed(reason.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        CodeError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CodeError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            CodeError::ContactRejected(reason) if reason.is_already_used() => {
                ErrorCode::ContactAlreadyUsed
            }
            CodeError::ContactRejected(_) => ErrorCode::ValidationFailed,
            CodeError::DealNotFound(_) => ErrorCode::DealNotFound,
            CodeError::Forbidden { .. } | CodeError::AdminOnly(_) => ErrorCode::Forbidden,
            CodeError::DealNotRedeemable(_) => ErrorCode::InvalidStateTransition,
            CodeError::CodeNotFound(_) => ErrorCode::CodeNotFound,
            CodeError::AlreadyUsed(_) => ErrorCode::CodeAlreadyUsed,
            CodeError::PoolExhausted(_) => ErrorCode::CodesExhausted,
            CodeError::GenerationInProgress(_) => ErrorCode::GenerationInProgress,
            CodeError::PartialGeneration { .. } => ErrorCode::DatabaseError,
            CodeError::NotificationFailed { .. } => ErrorCode::NotificationFailed,
            CodeError::PaymentFailed(_) => ErrorCode::PaymentFailed,
            CodeError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            CodeError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            CodeError::ContactRejected(reason) => reason.user_message().to_string(),
            CodeError::DealNotFound(id) => format!("Deal not found: {}", id),
            CodeError::Forbidden { salon_id, deal_id } => {
                format!("Salon {} may not manage codes for deal {}", salon_id, deal_id)
            }
            CodeError::AdminOnly(salon_id) => {
                format!("Salon {} is not an administrator", salon_id)
            }
            CodeError::DealNotRedeemable(_) => {
                "Erbjudandet går inte att lösa in just nu".to_string()
            }
            CodeError::CodeNotFound(code) => format!("Discount code not found: {}", code),
            CodeError::AlreadyUsed(code) => format!("Discount code {} has already been used", code),
            CodeError::PoolExhausted(_) => {
                "Tyvärr, alla rabattkoder för detta erbjudande är slut".to_string()
            }
            CodeError::GenerationInProgress(id) => {
                format!("Codes for deal {} are being generated, try again shortly", id)
            }
            CodeError::PartialGeneration {
                inserted,
                requested,
            } => format!(
                "Code generation stopped after {} of {} codes",
                inserted, requested
            ),
            CodeError::NotificationFailed { code } => format!(
                "Din kod är {} men vi kunde inte skicka e-post. Spara koden.",
                code
            ),
            CodeError::PaymentFailed(reason) => format!("Payment failed: {}", reason),
            CodeError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CodeError::Infrastructure(_)
                | CodeError::PartialGeneration { .. }
                | CodeError::PaymentFailed(_)
        )
    }
}

impl std::fmt::Display for CodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for CodeError {}

impl From<DomainError> for CodeError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => CodeError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::CodeNotFound => CodeError::CodeNotFound(err.message),
            _ => CodeError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for CodeError {
    fn from(err: ValidationError) -> Self {
        CodeError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<ContactRejection> for CodeError {
    fn from(reason: ContactRejection) -> Self {
        CodeError::ContactRejected(reason)
    }
}

impl From<CodeError> for DomainError {
    fn from(err: CodeError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
