//! Deal queries: a single deal and a salon's deal list.

use std::sync::Arc;

use crate::domain::deal::{ApprovalStatus, Deal, DealError};
use crate::domain::foundation::{DealId, SalonId};
use crate::domain::salon::Salon;
use crate::ports::DealRepository;

/// Query for one deal. Without a viewer only live deals are visible.
#[derive(Debug, Clone)]
pub struct GetDealQuery {
    pub deal_id: DealId,
    pub viewer: Option<Salon>,
}

pub struct GetDealHandler {
    deals: Arc<dyn DealRepository>,
}

impl GetDealHandler {
    pub fn new(deals: Arc<dyn DealRepository>) -> Self {
        Self { deals }
    }

    pub async fn handle(&self, query: GetDealQuery) -> Result<Deal, DealError> {
        let deal = self
            .deals
            .find_by_id(&query.deal_id)
            .await?
            .ok_or(DealError::not_found(query.deal_id))?;

        let manages = query
            .viewer
            .as_ref()
            .is_some_and(|viewer| viewer.can_manage(&deal.salon_id));
        let live = deal.is_active && deal.approval == ApprovalStatus::Approved;
        if !manages && !live {
            // Unpublished deals look absent to outsiders.
            return Err(DealError::not_found(query.deal_id));
        }
        Ok(deal)
    }
}

/// Query for every deal of a salon. Salons always get their own list;
/// admins may name any salon.
#[derive(Debug, Clone)]
pub struct ListDealsQuery {
    pub salon_id: Option<SalonId>,
    pub actor: Salon,
}

pub struct ListDealsHandler {
    deals: Arc<dyn DealRepository>,
}

impl ListDealsHandler {
    pub fn new(deals: Arc<dyn DealRepository>) -> Self {
        Self { deals }
    }

    pub async fn handle(&self, query: ListDealsQuery) -> Result<Vec<Deal>, DealError> {
        let salon_id = match query.salon_id {
            Some(id) if query.actor.is_admin() => id,
            _ => query.actor.id,
        };
        Ok(self.deals.list_by_salon(&salon_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::fixture;
    use crate::domain::deal::test_support::details;
    use crate::domain::foundation::Timestamp;

    #[tokio::test]
    async fn public_sees_live_deal() {
        let f = fixture().await;
        let handler = GetDealHandler::new(f.store.clone());

        let deal = handler
            .handle(GetDealQuery {
                deal_id: f.deal.id,
                viewer: None,
            })
            .await
            .unwrap();

        assert_eq!(deal.id, f.deal.id);
    }

    #[tokio::test]
    async fn pending_deal_is_hidden_from_public_but_not_owner() {
        let f = fixture().await;
        let pending = Deal::create(DealId::new(), f.owner.id, details("Ny"), Timestamp::now()).unwrap();
        DealRepository::save(f.store.as_ref(), &pending).await.unwrap();
        let handler = GetDealHandler::new(f.store.clone());

        let public = handler
            .handle(GetDealQuery {
                deal_id: pending.id,
                viewer: None,
            })
            .await;
        let owner = handler
            .handle(GetDealQuery {
                deal_id: pending.id,
                viewer: Some(f.owner.clone()),
            })
            .await;

        assert_eq!(public, Err(DealError::not_found(pending.id)));
        assert!(owner.is_ok());
    }

    #[tokio::test]
    async fn list_returns_salon_deals_only() {
        let f = fixture().await;
        let handler = ListDealsHandler::new(f.store.clone());

        let own = handler
            .handle(ListDealsQuery {
                salon_id: None,
                actor: f.owner.clone(),
            })
            .await
            .unwrap();
        let other = handler
            .handle(ListDealsQuery {
                salon_id: Some(f.other.id),
                actor: f.admin.clone(),
            })
            .await
            .unwrap();
        let snooping = handler
            .handle(ListDealsQuery {
                salon_id: Some(f.owner.id),
                actor: f.other.clone(),
            })
            .await
            .unwrap();

        assert_eq!(own.len(), 1);
        assert!(other.is_empty());
        assert!(snooping.is_empty());
    }
}
