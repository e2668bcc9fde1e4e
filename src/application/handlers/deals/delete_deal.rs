//! DeleteDealHandler - Command handler for removing a deal.

use std::sync::Arc;

use crate::domain::deal::DealError;
use crate::domain::foundation::DealId;
use crate::domain::salon::Salon;
use crate::ports::{DealRepository, DiscountCodeRepository};

#[derive(Debug, Clone)]
pub struct DeleteDealCommand {
    pub deal_id: DealId,
    pub actor: Salon,
}

/// Handler for deleting deals.
///
/// A deal with any codes, used or not, is kept so redemptions stay traceable.
pub struct DeleteDealHandler {
    deals: Arc<dyn DealRepository>,
    codes: Arc<dyn DiscountCodeRepository>,
}

impl DeleteDealHandler {
    pub fn new(deals: Arc<dyn DealRepository>, codes: Arc<dyn DiscountCodeRepository>) -> Self {
        Self { deals, codes }
    }

    pub async fn handle(&self, cmd: DeleteDealCommand) -> Result<(), DealError> {
        let deal = self
            .deals
            .find_by_id(&cmd.deal_id)
            .await?
            .ok_or(DealError::not_found(cmd.deal_id))?;
        if !cmd.actor.can_manage(&deal.salon_id) {
            return Err(DealError::forbidden(cmd.actor.id, deal.id));
        }
        if self.codes.count_for_deal(&deal.id).await? > 0 {
            return Err(DealError::has_codes(deal.id));
        }

        self.deals.delete(&deal.id).await?;
        tracing::info!(deal_id = %deal.id, "Deal deleted");
        Ok(())
    }
}
