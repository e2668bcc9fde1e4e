//! Payment provider port for one-off deal purchases.
//!
//! Paid deals go through a hosted checkout. The checkout session carries the
//! deal and customer in its metadata; the provider's signed completion
//! webhook then triggers the same claim-and-notify flow as a free redemption.
//!
//! # Design
//!
//! - **Gateway agnostic**: Interface works with any payment provider
//! - **Metadata round-trip**: Everything needed after payment travels in the session

use crate::domain::foundation::{DealId, DomainError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Port for payment provider integrations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a checkout session for one deal purchase.
    ///
    /// Returns a URL for the customer to complete payment.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Verify a webhook signature and parse the event.
    ///
    /// Returns the parsed event if valid, error if signature invalid.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, PaymentError>;
}

/// Request to create a checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCheckoutRequest {
    pub deal_id: DealId,

    /// Line item shown on the hosted checkout page.
    pub product_name: String,

    /// Amount in the currency's minor unit (öre for SEK).
    pub amount_minor: i64,

    /// Customer email for pre-fill.
    pub customer_email: String,

    /// Echoed back unchanged in the completion webhook.
    pub metadata: CheckoutMetadata,

    /// URL to redirect after successful checkout.
    pub success_url: String,

    /// URL to redirect after canceled checkout.
    pub cancel_url: String,
}

/// Deal and customer details stored on the checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutMetadata {
    pub deal_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub newsletter: bool,
}

impl CheckoutMetadata {
    /// Flattens into the provider's string key/value metadata.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("deal_id", self.deal_id.clone()),
            ("customer_name", self.customer_name.clone()),
            ("customer_email", self.customer_email.clone()),
            ("customer_phone", self.customer_phone.clone()),
            ("newsletter", self.newsletter.to_string()),
        ]
    }

    /// Reads metadata back from the provider's key/value map.
    pub fn from_map(map: &HashMap<String, String>) -> Option<Self> {
        Some(Self {
            deal_id: map.get("deal_id")?.clone(),
            customer_name: map.get("customer_name")?.clone(),
            customer_email: map.get("customer_email")?.clone(),
            customer_phone: map.get("customer_phone")?.clone(),
            newsletter: map.get("newsletter").map(|v| v == "true").unwrap_or(false),
        })
    }
}

/// Checkout session for payment completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID.
    pub id: String,

    /// URL for customer to complete checkout.
    pub url: String,

    /// When the session expires (Unix timestamp).
    pub expires_at: i64,
}

/// Webhook event from payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from provider.
    pub id: String,

    /// Event type.
    pub event_type: WebhookEventType,

    /// Event payload.
    pub data: WebhookEventData,

    /// When the event occurred (Unix timestamp).
    pub created_at: i64,
}

/// Types of webhook events we distinguish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// Checkout session completed successfully.
    CheckoutSessionCompleted,

    /// Checkout session expired without payment.
    CheckoutSessionExpired,

    /// Unknown event type.
    Unknown(String),
}

/// Webhook event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WebhookEventData {
    /// Checkout session data.
    #[serde(rename = "checkout")]
    Checkout {
        session_id: String,
        payment_status: Option<String>,
        metadata: Option<CheckoutMetadata>,
    },

    /// Raw/unknown event data.
    #[serde(rename = "raw")]
    Raw { json: String },
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Create with provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }

    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidWebhook, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        use crate::domain::foundation::ErrorCode;

        let code = match err.code {
            PaymentErrorCode::InvalidWebhook => ErrorCode::Unauthorized,
            PaymentErrorCode::InvalidRequest => ErrorCode::ValidationFailed,
            _ => ErrorCode::PaymentFailed,
        };

        DomainError::new(code, err.message)
    }
}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Request rejected by the provider.
    InvalidRequest,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Invalid webhook signature.
    InvalidWebhook,

    /// Provider API error.
    ProviderError,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::InvalidWebhook => "invalid_webhook",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
