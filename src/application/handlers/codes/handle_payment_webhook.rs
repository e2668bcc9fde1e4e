//! HandlePaymentWebhookHandler - issues the code for a paid checkout.
//!
//! # Event handling
//!
//! | Event | Action |
//! |-------|--------|
//! | `checkout.session.completed` (paid) | Claim a code and email it |
//! | `checkout.session.completed` (unpaid) | Acknowledge |
//! | `checkout.session.expired` | Acknowledge |
//! | anything else | Ignore |
//!
//! Providers redeliver events. A repeated completion finds the customer
//! already holding a code for the deal and is reported as `AlreadyProcessed`.

use std::sync::Arc;

use serde::Serialize;

use super::redeem_deal::RedeemDealHandler;
use crate::domain::codes::CodeError;
use crate::domain::foundation::DealId;
use crate::domain::redemption::CustomerInfo;
use crate::ports::{
    CheckoutMetadata, DealRepository, PaymentProvider, WebhookEvent, WebhookEventData,
    WebhookEventType,
};

/// Raw webhook delivery.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    pub payload: Vec<u8>,
    pub signature: String,
}

/// What a delivered event resulted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookOutcome {
    /// A code was claimed. `notified` is false when the email failed.
    CodeIssued {
        deal_id: DealId,
        code: String,
        notified: bool,
    },
    /// The customer already holds a code for this deal.
    AlreadyProcessed,
    /// Payment succeeded but the pool ran dry; needs a manual refund.
    PoolExhausted { deal_id: DealId },
    /// Event understood, nothing to do.
    Acknowledged,
    /// Event type not handled.
    Ignored,
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Checkout metadata missing or malformed: {0}")]
    MissingMetadata(String),

    #[error(transparent)]
    Processing(#[from] CodeError),
}

pub struct HandlePaymentWebhookHandler {
    payments: Arc<dyn PaymentProvider>,
    deals: Arc<dyn DealRepository>,
    redeem: Arc<RedeemDealHandler>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        payments: Arc<dyn PaymentProvider>,
        deals: Arc<dyn DealRepository>,
        redeem: Arc<RedeemDealHandler>,
    ) -> Self {
        Self {
            payments,
            deals,
            redeem,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<WebhookOutcome, WebhookError> {
        let event = self
            .payments
            .verify_webhook(&cmd.payload, &cmd.signature)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Webhook verification failed");
                WebhookError::InvalidSignature
            })?;

        tracing::info!(event_id = %event.id, event_type = ?event.event_type, "Payment webhook received");

        match &event.event_type {
            WebhookEventType::CheckoutSessionCompleted => self.on_completed(&event).await,
            WebhookEventType::CheckoutSessionExpired => Ok(WebhookOutcome::Acknowledged),
            WebhookEventType::Unknown(kind) => {
                tracing::debug!(event_type = %kind, "Ignoring webhook event");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    async fn on_completed(&self, event: &WebhookEvent) -> Result<WebhookOutcome, WebhookError> {
        let WebhookEventData::Checkout {
            session_id,
            payment_status,
            metadata,
        } = &event.data
        else {
            return Err(WebhookError::MissingMetadata(event.id.clone()));
        };

        if payment_status.as_deref() != Some("paid") {
            tracing::info!(session_id = %session_id, status = ?payment_status, "Checkout completed without payment");
            return Ok(WebhookOutcome::Acknowledged);
        }

        let metadata = metadata
            .as_ref()
            .ok_or_else(|| WebhookError::MissingMetadata(session_id.clone()))?;
        let (deal_id, customer) = parse_metadata(metadata)?;

        let deal = self
            .deals
            .find_by_id(&deal_id)
            .await
            .map_err(CodeError::from)?
            .ok_or(CodeError::deal_not_found(deal_id))?;

        // Paid already: the code is owed even if the deal was paused since.
        match self.redeem.fulfil(&deal, &customer).await {
            Ok(result) => Ok(WebhookOutcome::CodeIssued {
                deal_id,
                code: result.code.into_inner(),
                notified: true,
            }),
            Err(CodeError::NotificationFailed { code }) => Ok(WebhookOutcome::CodeIssued {
                deal_id,
                code,
                notified: false,
            }),
            Err(CodeError::ContactRejected(reason)) if reason.is_already_used() => {
                tracing::info!(session_id = %session_id, "Checkout already fulfilled");
                Ok(WebhookOutcome::AlreadyProcessed)
            }
            Err(CodeError::PoolExhausted(_)) => {
                tracing::error!(
                    deal_id = %deal_id,
                    session_id = %session_id,
                    "Paid checkout could not be fulfilled, pool exhausted"
                );
                Ok(WebhookOutcome::PoolExhausted { deal_id })
            }
            Err(other) => Err(WebhookError::Processing(other)),
        }
    }
}

fn parse_metadata(metadata: &CheckoutMetadata) -> Result<(DealId, CustomerInfo), WebhookError> {
    let deal_id = metadata
        .deal_id
        .parse::<DealId>()
        .map_err(|_| WebhookError::MissingMetadata("deal_id".to_string()))?;
    let customer = CustomerInfo::parse(
        &metadata.customer_name,
        &metadata.customer_email,
        &metadata.customer_phone,
        metadata.newsletter,
    )
    .map_err(|reason| WebhookError::MissingMetadata(reason.field().to_string()))?;
    Ok((deal_id, customer))
}
