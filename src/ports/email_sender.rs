//! Email sender port for transactional mail.
//!
//! Sending is a side effect after a code has been consumed. A failure never
//! undoes the consumption; callers retry retryable errors and otherwise
//! surface the failure together with the code.

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::redemption::CodeNotification;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for delivering the code email to a customer.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send the code notification. Returns the provider's message id.
    async fn send_code(&self, notification: &CodeNotification) -> Result<String, EmailError>;
}

/// Errors from email delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailError {
    pub code: EmailErrorCode,
    pub message: String,
    pub retryable: bool,
}

impl EmailError {
    pub fn new(code: EmailErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(EmailErrorCode::NetworkError, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(EmailErrorCode::Rejected, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(EmailErrorCode::RateLimited, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(EmailErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for EmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for EmailError {}

impl From<EmailError> for DomainError {
    fn from(err: EmailError) -> Self {
        DomainError::new(ErrorCode::NotificationFailed, err.message)
    }
}

/// Email error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailErrorCode {
    NetworkError,
    RateLimited,
    /// Provider refused the message (bad recipient, invalid payload).
    Rejected,
    AuthenticationError,
    ProviderError,
}

impl EmailErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EmailErrorCode::NetworkError | EmailErrorCode::RateLimited | EmailErrorCode::ProviderError
        )
    }
}

impl std::fmt::Display for EmailErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EmailErrorCode::NetworkError => "network_error",
            EmailErrorCode::RateLimited => "rate_limited",
            EmailErrorCode::Rejected => "rejected",
            EmailErrorCode::AuthenticationError => "authentication_error",
            EmailErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
