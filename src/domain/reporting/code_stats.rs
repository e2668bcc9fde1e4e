use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DealId, SalonId, Timestamp};

/// Pool size and usage for one deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeStats {
    pub deal_id: DealId,
    pub total: u64,
    pub used: u64,
    pub unused: u64,
}

impl CodeStats {
    pub fn new(deal_id: DealId, total: u64, used: u64) -> Self {
        Self {
            deal_id,
            total,
            used,
            unused: total.saturating_sub(used),
        }
    }
}

/// A consumed code joined with its deal and customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRecord {
    pub code: String,
    pub deal_id: DealId,
    pub deal_title: String,
    pub salon_id: SalonId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub subscribed_to_newsletter: bool,
    pub used_at: Timestamp,
}

/// Narrows a redemption listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RedemptionFilter {
    pub salon_id: Option<SalonId>,
    pub deal_id: Option<DealId>,
}

impl RedemptionFilter {
    pub fn matches(&self, record: &RedemptionRecord) -> bool {
        self.salon_id.map_or(true, |id| id == record.salon_id)
            && self.deal_id.map_or(true, |id| id == record.deal_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(salon_id: SalonId, deal_id: DealId) -> RedemptionRecord {
        RedemptionRecord {
            code: "ABCD2345".to_string(),
            deal_id,
            deal_title: "Klippning".to_string(),
            salon_id,
            customer_name: "Anna".to_string(),
            customer_email: "anna@example.se".to_string(),
            customer_phone: "0701234567".to_string(),
            subscribed_to_newsletter: false,
            used_at: Timestamp::now(),
        }
    }

    #[test]
    fn stats_derive_unused_count() {
        let stats = CodeStats::new(DealId::new(), 5, 2);
        assert_eq!(stats.unused, 3);
    }

    #[test]
    fn empty_filter_matches_everything() {
        let r = record(SalonId::new(), DealId::new());
        assert!(RedemptionFilter::default().matches(&r));
    }

    #[test]
    fn filter_narrows_by_salon_and_deal() {
        let salon = SalonId::new();
        let deal = DealId::new();
        let r = record(salon, deal);

        let by_salon = RedemptionFilter {
            salon_id: Some(salon),
            deal_id: None,
        };
        let other_deal = RedemptionFilter {
            salon_id: Some(salon),
            deal_id: Some(DealId::new()),
        };
        assert!(by_salon.matches(&r));
        assert!(!other_deal.matches(&r));
    }
}
