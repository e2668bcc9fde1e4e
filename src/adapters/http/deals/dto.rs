//! HTTP DTOs for deal endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::ReviewDecision;
use crate::domain::deal::{ApprovalStatus, Deal, DealDetails, DealError, PricePair, RedemptionMode};
use crate::domain::foundation::SalonId;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Editable deal fields, used by both create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct DealRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub original_price: u32,
    pub discounted_price: u32,
    pub category: String,
    pub city: String,
    #[serde(default)]
    pub booking_url: Option<String>,
    #[serde(default)]
    pub redemption_mode: RedemptionMode,
    /// Admins may create a deal on behalf of another salon.
    #[serde(default)]
    pub salon_id: Option<SalonId>,
    /// Pause or resume on update; ignored on create.
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl DealRequest {
    pub fn details(&self) -> Result<DealDetails, DealError> {
        let price = PricePair::try_new(self.original_price, self.discounted_price)?;
        let booking_url = self
            .booking_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);
        Ok(DealDetails {
            title: self.title.clone(),
            description: self.description.clone(),
            price,
            category: self.category.clone(),
            city: self.city.clone(),
            booking_url,
            redemption_mode: self.redemption_mode,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDealsParams {
    pub salon_id: Option<SalonId>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct DealResponse {
    pub id: String,
    pub salon_id: String,
    pub title: String,
    pub description: String,
    pub original_price: u32,
    pub discounted_price: u32,
    pub discount_percent: u32,
    pub category: String,
    pub city: String,
    pub is_active: bool,
    pub approval: ApprovalStatus,
    pub booking_url: Option<String>,
    pub redemption_mode: RedemptionMode,
    pub views: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Deal> for DealResponse {
    fn from(deal: Deal) -> Self {
        Self {
            id: deal.id.to_string(),
            salon_id: deal.salon_id.to_string(),
            original_price: deal.price.original(),
            discounted_price: deal.price.discounted(),
            discount_percent: deal.price.discount_percent(),
            title: deal.title,
            description: deal.description,
            category: deal.category,
            city: deal.city,
            is_active: deal.is_active,
            approval: deal.approval,
            booking_url: deal.booking_url,
            redemption_mode: deal.redemption_mode,
            views: deal.views,
            created_at: deal.created_at.to_rfc3339(),
            updated_at: deal.updated_at.to_rfc3339(),
        }
    }
}
