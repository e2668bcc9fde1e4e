//! RecordViewHandler - counts storefront views for the conversion report.

use std::sync::Arc;

use crate::domain::deal::DealError;
use crate::domain::foundation::DealId;
use crate::ports::DealRepository;

pub struct RecordViewHandler {
    deals: Arc<dyn DealRepository>,
}

impl RecordViewHandler {
    pub fn new(deals: Arc<dyn DealRepository>) -> Self {
        Self { deals }
    }

    pub async fn handle(&self, deal_id: DealId) -> Result<(), DealError> {
        if !self.deals.record_view(&deal_id).await? {
            return Err(DealError::not_found(deal_id));
        }
        Ok(())
    }
}
