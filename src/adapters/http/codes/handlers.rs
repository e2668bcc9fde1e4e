//! HTTP handlers for discount code endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::adapters::http::error::ErrorResponse;
use crate::adapters::http::middleware::RequireSalon;
use crate::adapters::http::AppState;
use crate::application::handlers::{
    AllocateCodeQuery, GenerateCodesCommand, HandlePaymentWebhookCommand, MarkCodeUsedCommand,
    RedeemDealCommand, StartCheckoutCommand, ValidateContactQuery, WebhookError,
};
use crate::domain::codes::CodeError;
use crate::domain::foundation::DealId;

use super::dto::{
    CheckoutRequest, CheckoutResponse, DiscountCodeResponse, GenerateCodesRequest,
    MarkCodeUsedRequest, NextCodeResponse, RedeemRequest, RedeemResponse, ValidateContactRequest,
    ValidateContactResponse,
};

/// Header Stripe signs webhook deliveries with.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Storefront
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/deals/:id/redeem - Claim a code and email it
pub async fn redeem_deal(
    State(state): State<AppState>,
    Path(deal_id): Path<DealId>,
    Json(request): Json<RedeemRequest>,
) -> Result<impl IntoResponse, CodeApiError> {
    let cmd = RedeemDealCommand {
        deal_id,
        name: request.name,
        email: request.email,
        phone: request.phone,
        newsletter: request.newsletter,
    };

    let result = state.redeem_deal_handler().handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(RedeemResponse::from(result))))
}

/// POST /api/deals/:id/validate-contact - Check email and phone before submitting
pub async fn validate_contact(
    State(state): State<AppState>,
    Path(deal_id): Path<DealId>,
    Json(request): Json<ValidateContactRequest>,
) -> Result<impl IntoResponse, CodeApiError> {
    let query = ValidateContactQuery {
        deal_id,
        email: request.email,
        phone: request.phone,
    };

    let validation = state.validate_contact_handler().handle(query).await?;

    Ok(Json(ValidateContactResponse::from(validation)))
}

/// POST /api/deals/:id/checkout - Open a hosted payment page for a paid deal
pub async fn start_checkout(
    State(state): State<AppState>,
    Path(deal_id): Path<DealId>,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, CodeApiError> {
    let base = state.public_base_url.trim_end_matches('/');
    let cmd = StartCheckoutCommand {
        deal_id,
        name: request.name,
        email: request.email,
        phone: request.phone,
        newsletter: request.newsletter,
        success_url: request
            .success_url
            .unwrap_or_else(|| format!("{}/deals/{}?checkout=success", base, deal_id)),
        cancel_url: request
            .cancel_url
            .unwrap_or_else(|| format!("{}/deals/{}?checkout=cancelled", base, deal_id)),
    };

    let session = state.start_checkout_handler().handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(CheckoutResponse::from(session))))
}

/// POST /api/webhooks/stripe - Handle Stripe webhook events
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookApiError(WebhookError::InvalidSignature))?;

    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    let outcome = state.webhook_handler().handle(cmd).await?;

    Ok(Json(outcome))
}

// ════════════════════════════════════════════════════════════════════════════════
// Salon / admin
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/deals/:id/codes - Fill the deal's code pool
pub async fn generate_codes(
    State(state): State<AppState>,
    RequireSalon(actor): RequireSalon,
    Path(deal_id): Path<DealId>,
    Json(request): Json<GenerateCodesRequest>,
) -> Result<impl IntoResponse, CodeApiError> {
    let cmd = GenerateCodesCommand {
        deal_id,
        quantity: request.quantity,
        actor,
    };

    let outcome = state.generate_codes_handler().handle(cmd).await?;

    let status = if outcome.skipped_existing {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(outcome)))
}

/// GET /api/admin/deals/:id/codes/next - Peek at the next unused code
pub async fn next_code(
    State(state): State<AppState>,
    RequireSalon(actor): RequireSalon,
    Path(deal_id): Path<DealId>,
) -> Result<impl IntoResponse, CodeApiError> {
    let code = state
        .allocate_code_handler()
        .handle(AllocateCodeQuery { deal_id, actor })
        .await?;

    Ok(Json(NextCodeResponse {
        code: code.map(|c| c.into_inner()),
    }))
}

/// POST /api/admin/codes/:code/use - Register a code handed out manually
pub async fn mark_code_used(
    State(state): State<AppState>,
    RequireSalon(actor): RequireSalon,
    Path(code): Path<String>,
    Json(request): Json<MarkCodeUsedRequest>,
) -> Result<impl IntoResponse, CodeApiError> {
    let cmd = MarkCodeUsedCommand {
        code,
        name: request.name,
        email: request.email,
        phone: request.phone,
        newsletter: request.newsletter,
        actor,
    };

    let used = state.mark_code_used_handler().handle(cmd).await?;

    Ok(Json(DiscountCodeResponse::from(used)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts code errors to HTTP responses.
#[derive(Debug)]
pub struct CodeApiError(pub CodeError);

impl From<CodeError> for CodeApiError {
    fn from(err: CodeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for CodeApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CodeError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            CodeError::ContactRejected(reason) if reason.is_already_used() => StatusCode::CONFLICT,
            CodeError::ContactRejected(_) => StatusCode::BAD_REQUEST,
            CodeError::DealNotFound(_) | CodeError::CodeNotFound(_) => StatusCode::NOT_FOUND,
            CodeError::Forbidden { .. } | CodeError::AdminOnly(_) => StatusCode::FORBIDDEN,
            CodeError::DealNotRedeemable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CodeError::AlreadyUsed(_) | CodeError::GenerationInProgress(_) => StatusCode::CONFLICT,
            CodeError::PoolExhausted(_) => StatusCode::GONE,
            CodeError::NotificationFailed { .. } | CodeError::PaymentFailed(_) => {
                StatusCode::BAD_GATEWAY
            }
            CodeError::PartialGeneration { .. } | CodeError::Infrastructure(_) => {
                tracing::error!(error = %self.0, "Discount code request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let error_code = self.0.code().to_string();
        let message = self.0.message();
        let body = match &self.0 {
            CodeError::ContactRejected(reason) => ErrorResponse::with_details(
                error_code,
                message,
                serde_json::json!({ "field": reason.field(), "reason": reason }),
            ),
            // The code is already consumed; the customer must still see it.
            CodeError::NotificationFailed { code } => ErrorResponse::with_details(
                error_code,
                message,
                serde_json::json!({ "code": code }),
            ),
            CodeError::PartialGeneration {
                inserted,
                requested,
            } => ErrorResponse::with_details(
                error_code,
                message,
                serde_json::json!({ "inserted": inserted, "requested": requested }),
            ),
            _ => ErrorResponse::new(error_code, message),
        };

        (status, Json(body)).into_response()
    }
}

/// API error type for webhook deliveries.
///
/// Non-2xx responses make the provider redeliver, so only infrastructure
/// failures should surface as 5xx.
#[derive(Debug)]
pub struct WebhookApiError(pub WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        match self.0 {
            WebhookError::InvalidSignature => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    "INVALID_WEBHOOK_SIGNATURE",
                    "Invalid webhook signature",
                )),
            )
                .into_response(),
            err @ WebhookError::MissingMetadata(_) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("VALIDATION_FAILED", err.to_string())),
            )
                .into_response(),
            WebhookError::Processing(err) => CodeApiError(err).into_response(),
        }
    }
}
