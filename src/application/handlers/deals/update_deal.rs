//! UpdateDealHandler - Command handler for editing a deal.

use std::sync::Arc;

use crate::domain::deal::{Deal, DealDetails, DealError};
use crate::domain::foundation::{DealId, Timestamp};
use crate::domain::salon::Salon;
use crate::ports::DealRepository;

/// Command to edit a deal's details and, optionally, pause or resume it.
#[derive(Debug, Clone)]
pub struct UpdateDealCommand {
    pub deal_id: DealId,
    pub details: DealDetails,
    pub is_active: Option<bool>,
    pub actor: Salon,
}

/// Handler for editing deals. An approved deal goes back to review.
pub struct UpdateDealHandler {
    deals: Arc<dyn DealRepository>,
}

impl UpdateDealHandler {
    pub fn new(deals: Arc<dyn DealRepository>) -> Self {
        Self { deals }
    }

    pub async fn handle(&self, cmd: UpdateDealCommand) -> Result<Deal, DealError> {
        let mut deal = self
            .deals
            .find_by_id(&cmd.deal_id)
            .await?
            .ok_or(DealError::not_found(cmd.deal_id))?;
        if !cmd.actor.can_manage(&deal.salon_id) {
            return Err(DealError::forbidden(cmd.actor.id, deal.id));
        }

        let now = Timestamp::now();
        deal.update(cmd.details, now)?;
        if let Some(active) = cmd.is_active {
            deal.set_active(active, now);
        }
        self.deals.update(&deal).await?;

        tracing::info!(deal_id = %deal.id, approval = %deal.approval.as_str(), "Deal updated");
        Ok(deal)
    }
}
