//! GetCodeStatsHandler - Query handler for a deal's pool usage.

use std::sync::Arc;

use crate::domain::codes::CodeError;
use crate::domain::foundation::DealId;
use crate::domain::reporting::CodeStats;
use crate::domain::salon::Salon;
use crate::ports::{CodeReader, DealRepository};

#[derive(Debug, Clone)]
pub struct GetCodeStatsQuery {
    pub deal_id: DealId,
    pub actor: Salon,
}

pub struct GetCodeStatsHandler {
    deals: Arc<dyn DealRepository>,
    reader: Arc<dyn CodeReader>,
}

impl GetCodeStatsHandler {
    pub fn new(deals: Arc<dyn DealRepository>, reader: Arc<dyn CodeReader>) -> Self {
        Self { deals, reader }
    }

    pub async fn handle(&self, query: GetCodeStatsQuery) -> Result<CodeStats, CodeError> {
        let deal = self
            .deals
            .find_by_id(&query.deal_id)
            .await?
            .ok_or(CodeError::deal_not_found(query.deal_id))?;
        if !query.actor.can_manage(&deal.salon_id) {
            return Err(CodeError::forbidden(query.actor.id, deal.id));
        }
        Ok(self.reader.code_stats(&deal.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{fixture, seed_codes};
    use crate::domain::foundation::Timestamp;
    use crate::domain::redemption::CustomerInfo;
    use crate::ports::DiscountCodeRepository;

    #[tokio::test]
    async fn stats_count_used_and_unused() {
        let f = fixture().await;
        seed_codes(&f.store, f.deal.id, &["AAAA2222", "BBBB3333", "CCCC4444"]).await;
        let customer = CustomerInfo::parse("Anna", "anna@example.se", "0701234567", false).unwrap();
        f.store.claim(&f.deal.id, &customer, Timestamp::now()).await.unwrap();
        let handler = GetCodeStatsHandler::new(f.store.clone(), f.store.clone());

        let stats = handler
            .handle(GetCodeStatsQuery {
                deal_id: f.deal.id,
                actor: f.owner.clone(),
            })
            .await
            .unwrap();

        assert_eq!(stats, CodeStats::new(f.deal.id, 3, 1));
        assert_eq!(stats.unused, 2);
    }

    #[tokio::test]
    async fn other_salon_is_forbidden() {
        let f = fixture().await;
        let handler = GetCodeStatsHandler::new(f.store.clone(), f.store.clone());

        let result = handler
            .handle(GetCodeStatsQuery {
                deal_id: f.deal.id,
                actor: f.other.clone(),
            })
            .await;

        assert!(matches!(result, Err(CodeError::Forbidden { .. })));
    }
}
