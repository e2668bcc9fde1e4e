//! AllocateCodeHandler - Query handler that peeks the next unused code.
//!
//! Nothing is reserved: two callers may see the same code. Consumption must
//! go through `MarkCodeUsedHandler` or the atomic claim in `RedeemDealHandler`.

use std::sync::Arc;

use crate::domain::codes::{CodeError, CodeValue};
use crate::domain::foundation::DealId;
use crate::domain::salon::Salon;
use crate::ports::{DealRepository, DiscountCodeRepository};

#[derive(Debug, Clone)]
pub struct AllocateCodeQuery {
    pub deal_id: DealId,
    pub actor: Salon,
}

pub struct AllocateCodeHandler {
    deals: Arc<dyn DealRepository>,
    codes: Arc<dyn DiscountCodeRepository>,
}

impl AllocateCodeHandler {
    pub fn new(deals: Arc<dyn DealRepository>, codes: Arc<dyn DiscountCodeRepository>) -> Self {
        Self { deals, codes }
    }

    /// Returns an unused code of the deal, or `None` when the pool is empty.
    pub async fn handle(&self, query: AllocateCodeQuery) -> Result<Option<CodeValue>, CodeError> {
        let deal = self
            .deals
            .find_by_id(&query.deal_id)
            .await?
            .ok_or(CodeError::deal_not_found(query.deal_id))?;
        if !query.actor.can_manage(&deal.salon_id) {
            return Err(CodeError::forbidden(query.actor.id, deal.id));
        }

        let code = self.codes.find_unused(&deal.id).await?;
        Ok(code.map(|c| c.code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{fixture, seed_codes};

    #[tokio::test]
    async fn returns_an_unused_code_without_consuming_it() {
        let f = fixture().await;
        seed_codes(&f.store, f.deal.id, &["AAAA2222", "BBBB3333"]).await;
        let handler = AllocateCodeHandler::new(f.store.clone(), f.store.clone());
        let query = AllocateCodeQuery {
            deal_id: f.deal.id,
            actor: f.owner.clone(),
        };

        let first = handler.handle(query.clone()).await.unwrap();
        let again = handler.handle(query).await.unwrap();

        assert_eq!(first, again);
        assert!(f.store.codes_for_deal(&f.deal.id).await.iter().all(|c| !c.is_used()));
    }

    #[tokio::test]
    async fn empty_pool_returns_none() {
        let f = fixture().await;
        let handler = AllocateCodeHandler::new(f.store.clone(), f.store.clone());

        let code = handler
            .handle(AllocateCodeQuery {
                deal_id: f.deal.id,
                actor: f.admin.clone(),
            })
            .await
            .unwrap();

        assert!(code.is_none());
    }

    #[tokio::test]
    async fn other_salon_is_forbidden() {
        let f = fixture().await;
        let handler = AllocateCodeHandler::new(f.store.clone(), f.store.clone());

        let result = handler
            .handle(AllocateCodeQuery {
                deal_id: f.deal.id,
                actor: f.other.clone(),
            })
            .await;

        assert!(matches!(result, Err(CodeError::Forbidden { .. })));
    }
}
