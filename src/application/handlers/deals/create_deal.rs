//! CreateDealHandler - Command handler for publishing a new deal.

use std::sync::Arc;

use crate::domain::deal::{Deal, DealDetails, DealError};
use crate::domain::foundation::{DealId, SalonId, Timestamp};
use crate::domain::salon::Salon;
use crate::ports::{DealRepository, SalonRepository};

/// Command to create a deal.
#[derive(Debug, Clone)]
pub struct CreateDealCommand {
    pub details: DealDetails,
    /// Owning salon. Only admins may create on behalf of another salon.
    pub salon_id: Option<SalonId>,
    pub actor: Salon,
}

/// Handler for creating deals. New deals start active and pending review.
pub struct CreateDealHandler {
    deals: Arc<dyn DealRepository>,
    salons: Arc<dyn SalonRepository>,
}

impl CreateDealHandler {
    pub fn new(deals: Arc<dyn DealRepository>, salons: Arc<dyn SalonRepository>) -> Self {
        Self { deals, salons }
    }

    pub async fn handle(&self, cmd: CreateDealCommand) -> Result<Deal, DealError> {
        let deal_id = DealId::new();
        let owner = cmd.salon_id.unwrap_or(cmd.actor.id);
        if !cmd.actor.can_manage(&owner) {
            return Err(DealError::forbidden(cmd.actor.id, deal_id));
        }
        if owner != cmd.actor.id && self.salons.find_by_id(&owner).await?.is_none() {
            return Err(DealError::validation("salon_id", "unknown salon"));
        }

        let deal = Deal::create(deal_id, owner, cmd.details, Timestamp::now())?;
        self.deals.save(&deal).await?;

        tracing::info!(deal_id = %deal.id, salon_id = %owner, "Deal created");
        Ok(deal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::fixture;
    use crate::domain::deal::test_support::details;
    use crate::domain::deal::ApprovalStatus;

    #[tokio::test]
    async fn salon_creates_pending_active_deal() {
        let f = fixture().await;
        let handler = CreateDealHandler::new(f.store.clone(), f.store.clone());

        let deal = handler
            .handle(CreateDealCommand {
                details: details("Färgning"),
                salon_id: None,
                actor: f.owner.clone(),
            })
            .await
            .unwrap();

        assert_eq!(deal.salon_id, f.owner.id);
        assert_eq!(deal.approval, ApprovalStatus::Pending);
        assert!(deal.is_active);
        let stored = DealRepository::find_by_id(f.store.as_ref(), &deal.id).await.unwrap();
        assert_eq!(stored, Some(deal));
    }

    #[tokio::test]
    async fn admin_creates_on_behalf_of_salon() {
        let f = fixture().await;
        let handler = CreateDealHandler::new(f.store.clone(), f.store.clone());

        let deal = handler
            .handle(CreateDealCommand {
                details: details("Manikyr"),
                salon_id: Some(f.other.id),
                actor: f.admin.clone(),
            })
            .await
            .unwrap();

        assert_eq!(deal.salon_id, f.other.id);
    }

    #[tokio::test]
    async fn salon_cannot_create_for_another_salon() {
        let f = fixture().await;
        let handler = CreateDealHandler::new(f.store.clone(), f.store.clone());

        let result = handler
            .handle(CreateDealCommand {
                details: details("Manikyr"),
                salon_id: Some(f.other.id),
                actor: f.owner.clone(),
            })
            .await;

        assert!(matches!(result, Err(DealError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn admin_cannot_target_unknown_salon() {
        let f = fixture().await;
        let handler = CreateDealHandler::new(f.store.clone(), f.store.clone());

        let result = handler
            .handle(CreateDealCommand {
                details: details("Manikyr"),
                salon_id: Some(SalonId::new()),
                actor: f.admin.clone(),
            })
            .await;

        assert!(matches!(result, Err(DealError::ValidationFailed { .. })));
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let f = fixture().await;
        let handler = CreateDealHandler::new(f.store.clone(), f.store.clone());

        let result = handler
            .handle(CreateDealCommand {
                details: details("   "),
                salon_id: None,
                actor: f.owner.clone(),
            })
            .await;

        assert!(matches!(result, Err(DealError::ValidationFailed { field, .. }) if field == "title"));
    }
}
