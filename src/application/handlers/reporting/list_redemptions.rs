//! ListRedemptionsHandler - Query handler for consumed codes and their customers.

use std::sync::Arc;

use crate::domain::codes::CodeError;
use crate::domain::reporting::{RedemptionFilter, RedemptionRecord};
use crate::domain::salon::Salon;
use crate::ports::CodeReader;

/// Query for redemptions.
///
/// A salon only ever sees its own redemptions; the salon filter is
/// honoured for admins only.
#[derive(Debug, Clone)]
pub struct ListRedemptionsQuery {
    pub filter: RedemptionFilter,
    pub actor: Salon,
}

pub struct ListRedemptionsHandler {
    reader: Arc<dyn CodeReader>,
}

impl ListRedemptionsHandler {
    pub fn new(reader: Arc<dyn CodeReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: ListRedemptionsQuery,
    ) -> Result<Vec<RedemptionRecord>, CodeError> {
        let mut filter = query.filter;
        if !query.actor.is_admin() {
            filter.salon_id = Some(query.actor.id);
        }
        Ok(self.reader.list_redemptions(&filter).await?)
    }
}
