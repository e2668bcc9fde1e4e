//! MarkCodeUsedHandler - Command handler that consumes a specific code.

use std::sync::Arc;

use crate::domain::codes::{CodeError, CodeValue, DiscountCode};
use crate::domain::foundation::Timestamp;
use crate::domain::redemption::CustomerInfo;
use crate::domain::salon::Salon;
use crate::ports::{DealRepository, DiscountCodeRepository, MarkUsedOutcome};

/// Command to bind a code to a customer.
#[derive(Debug, Clone)]
pub struct MarkCodeUsedCommand {
    pub code: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub newsletter: bool,
    pub actor: Salon,
}

/// Handler for consuming a code by value.
///
/// The store flips the code with a compare-and-swap, so a code already
/// taken by someone else is reported rather than overwritten.
pub struct MarkCodeUsedHandler {
    deals: Arc<dyn DealRepository>,
    codes: Arc<dyn DiscountCodeRepository>,
}

impl MarkCodeUsedHandler {
    pub fn new(deals: Arc<dyn DealRepository>, codes: Arc<dyn DiscountCodeRepository>) -> Self {
        Self { deals, codes }
    }

    pub async fn handle(&self, cmd: MarkCodeUsedCommand) -> Result<DiscountCode, CodeError> {
        // 1. Parse input
        let code = CodeValue::try_new(&cmd.code)?;
        let customer = CustomerInfo::parse(&cmd.name, &cmd.email, &cmd.phone, cmd.newsletter)?;

        // 2. Resolve owning deal and authorize
        let existing = self
            .codes
            .find_by_code(&code)
            .await?
            .ok_or_else(|| CodeError::code_not_found(code.as_str()))?;
        let deal = self
            .deals
            .find_by_id(&existing.deal_id)
            .await?
            .ok_or(CodeError::deal_not_found(existing.deal_id))?;
        if !cmd.actor.can_manage(&deal.salon_id) {
            return Err(CodeError::forbidden(cmd.actor.id, deal.id));
        }

        // 3. Compare-and-swap
        match self.codes.mark_used(&code, &customer, Timestamp::now()).await? {
            MarkUsedOutcome::Marked(used) => {
                tracing::info!(deal_id = %used.deal_id, code = %used.code, "Discount code marked used");
                Ok(used)
            }
            MarkUsedOutcome::NotFound => Err(CodeError::code_not_found(code.as_str())),
            MarkUsedOutcome::AlreadyUsed => Err(CodeError::already_used(code.as_str())),
            MarkUsedOutcome::ContactTaken(reason) => Err(CodeError::ContactRejected(reason)),
        }
    }
}
