//! ReviewDealHandler - Admin command handler for approving or rejecting deals.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::deal::{Deal, DealError};
use crate::domain::foundation::{DealId, Timestamp};
use crate::domain::salon::Salon;
use crate::ports::DealRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

#[derive(Debug, Clone)]
pub struct ReviewDealCommand {
    pub deal_id: DealId,
    pub decision: ReviewDecision,
    pub actor: Salon,
}

pub struct ReviewDealHandler {
    deals: Arc<dyn DealRepository>,
}

impl ReviewDealHandler {
    pub fn new(deals: Arc<dyn DealRepository>) -> Self {
        Self { deals }
    }

    pub async fn handle(&self, cmd: ReviewDealCommand) -> Result<Deal, DealError> {
        if !cmd.actor.is_admin() {
            return Err(DealError::forbidden(cmd.actor.id, cmd.deal_id));
        }

        let mut deal = self
            .deals
            .find_by_id(&cmd.deal_id)
            .await?
            .ok_or(DealError::not_found(cmd.deal_id))?;

        let now = Timestamp::now();
        match cmd.decision {
            ReviewDecision::Approve => deal.approve(now)?,
            ReviewDecision::Reject => deal.reject(now)?,
        }
        self.deals.update(&deal).await?;

        tracing::info!(deal_id = %deal.id, decision = ?cmd.decision, "Deal reviewed");
        Ok(deal)
    }
}
