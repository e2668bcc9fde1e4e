//! HTTP DTOs for discount code endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::RedeemDealResult;
use crate::domain::codes::DiscountCode;
use crate::domain::redemption::{ContactRejection, ContactValidation};
use crate::ports::CheckoutSession;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Storefront redemption form.
#[derive(Debug, Clone, Deserialize)]
pub struct RedeemRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub newsletter: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateContactRequest {
    pub email: String,
    pub phone: String,
}

/// Redemption form for a paid deal, plus optional redirect targets.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub newsletter: bool,
    #[serde(default)]
    pub success_url: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateCodesRequest {
    pub quantity: u32,
}

/// Salon-side registration of a code handed out at the counter.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkCodeUsedRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub newsletter: bool,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct RedeemResponse {
    pub code: String,
    pub deal_title: String,
}

impl From<RedeemDealResult> for RedeemResponse {
    fn from(result: RedeemDealResult) -> Self {
        Self {
            code: result.code.into_inner(),
            deal_title: result.deal_title,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidateContactResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ContactRejection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_phone: Option<String>,
}

impl From<ContactValidation> for ValidateContactResponse {
    fn from(validation: ContactValidation) -> Self {
        match validation {
            ContactValidation::Valid { phone, .. } => Self {
                valid: true,
                reason: None,
                message: None,
                normalized_phone: Some(phone.as_str().to_string()),
            },
            ContactValidation::Invalid(reason) => Self {
                valid: false,
                reason: Some(reason),
                message: Some(reason.user_message().to_string()),
                normalized_phone: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: String,
}

impl From<CheckoutSession> for CheckoutResponse {
    fn from(session: CheckoutSession) -> Self {
        Self {
            session_id: session.id,
            url: session.url,
        }
    }
}

/// Next unused code, or null when the pool is empty.
#[derive(Debug, Clone, Serialize)]
pub struct NextCodeResponse {
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscountCodeResponse {
    pub id: String,
    pub code: String,
    pub deal_id: String,
    pub used: bool,
    pub used_at: Option<String>,
    pub created_at: String,
}

impl From<DiscountCode> for DiscountCodeResponse {
    fn from(code: DiscountCode) -> Self {
        Self {
            id: code.id.to_string(),
            used: code.is_used(),
            used_at: code.used_at().map(|t| t.to_rfc3339()),
            created_at: code.created_at.to_rfc3339(),
            deal_id: code.deal_id.to_string(),
            code: code.code.into_inner(),
        }
    }
}
