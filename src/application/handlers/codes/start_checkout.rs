//! StartCheckoutHandler - Command handler that opens a hosted payment page
//! for a deal.
//!
//! No code is claimed here. The deal and customer travel in the checkout
//! metadata and the code is issued when the completion webhook arrives.

use std::sync::Arc;

use crate::domain::codes::CodeError;
use crate::domain::foundation::DealId;
use crate::domain::redemption::CustomerInfo;
use crate::ports::{
    CheckoutMetadata, CheckoutSession, CreateCheckoutRequest, DealRepository,
    DiscountCodeRepository, PaymentProvider,
};

#[derive(Debug, Clone)]
pub struct StartCheckoutCommand {
    pub deal_id: DealId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub newsletter: bool,
    pub success_url: String,
    pub cancel_url: String,
}

pub struct StartCheckoutHandler {
    deals: Arc<dyn DealRepository>,
    codes: Arc<dyn DiscountCodeRepository>,
    payments: Arc<dyn PaymentProvider>,
}

impl StartCheckoutHandler {
    pub fn new(
        deals: Arc<dyn DealRepository>,
        codes: Arc<dyn DiscountCodeRepository>,
        payments: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            deals,
            codes,
            payments,
        }
    }

    pub async fn handle(&self, cmd: StartCheckoutCommand) -> Result<CheckoutSession, CodeError> {
        let deal = self
            .deals
            .find_by_id(&cmd.deal_id)
            .await?
            .ok_or(CodeError::deal_not_found(cmd.deal_id))?;
        if !deal.is_redeemable() {
            return Err(CodeError::not_redeemable(deal.id));
        }

        let customer = CustomerInfo::parse(&cmd.name, &cmd.email, &cmd.phone, cmd.newsletter)?;
        if let Some(reason) = self
            .codes
            .find_contact_conflict(&deal.id, &customer.email, &customer.phone)
            .await?
        {
            return Err(CodeError::ContactRejected(reason));
        }

        // Don't take money for a deal that has nothing left to give.
        if self.codes.find_unused(&deal.id).await?.is_none() {
            return Err(CodeError::exhausted(deal.id));
        }

        let request = CreateCheckoutRequest {
            deal_id: deal.id,
            product_name: deal.title.clone(),
            amount_minor: deal.price.discounted_minor_units(),
            customer_email: customer.email.as_str().to_string(),
            metadata: CheckoutMetadata {
                deal_id: deal.id.to_string(),
                customer_name: customer.name.clone(),
                customer_email: customer.email.as_str().to_string(),
                customer_phone: customer.phone.as_str().to_string(),
                newsletter: customer.subscribed_to_newsletter,
            },
            success_url: cmd.success_url,
            cancel_url: cmd.cancel_url,
        };

        let session = self
            .payments
            .create_checkout_session(request)
            .await
            .map_err(|err| {
                tracing::error!(deal_id = %deal.id, error = %err, "Checkout session creation failed");
                CodeError::payment_failed(err.message)
            })?;

        tracing::info!(deal_id = %deal.id, session_id = %session.id, "Checkout session created");
        Ok(session)
    }
}
