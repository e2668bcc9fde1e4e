//! Deal aggregate - a purchasable discount offer owned by one salon.

use serde::{Deserialize, Serialize};

use super::errors::DealError;
use super::status::{ApprovalStatus, RedemptionMode};
use crate::domain::foundation::{DealId, SalonId, StateMachine, Timestamp, ValidationError};

const MAX_TITLE_LEN: usize = 120;

/// Original and discounted price in whole SEK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePair {
    original: u32,
    discounted: u32,
}

impl PricePair {
    /// Creates a price pair.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if either price is zero or the discounted
    /// price exceeds the original.
    pub fn try_new(original: u32, discounted: u32) -> Result<Self, ValidationError> {
        if original == 0 {
            return Err(ValidationError::out_of_range(
                "original_price",
                1,
                i64::from(u32::MAX),
                0,
            ));
        }
        if discounted == 0 || discounted > original {
            return Err(ValidationError::out_of_range(
                "discounted_price",
                1,
                i64::from(original),
                i64::from(discounted),
            ));
        }
        Ok(Self {
            original,
            discounted,
        })
    }

    pub fn original(&self) -> u32 {
        self.original
    }

    pub fn discounted(&self) -> u32 {
        self.discounted
    }

    /// Discounted price in öre, the minor unit the payment provider expects.
    pub fn discounted_minor_units(&self) -> i64 {
        i64::from(self.discounted) * 100
    }

    /// Whole-percent saving, rounded down.
    pub fn discount_percent(&self) -> u32 {
        let saved = u64::from(self.original - self.discounted);
        (saved * 100 / u64::from(self.original)) as u32
    }
}

/// Editable fields of a deal, shared by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealDetails {
    pub title: String,
    pub description: String,
    pub price: PricePair,
    pub category: String,
    pub city: String,
    pub booking_url: Option<String>,
    pub redemption_mode: RedemptionMode,
}

impl DealDetails {
    fn validate(&self) -> Result<(), ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::out_of_range(
                "title_length",
                1,
                MAX_TITLE_LEN as i64,
                title.chars().count() as i64,
            ));
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::empty_field("category"));
        }
        if self.city.trim().is_empty() {
            return Err(ValidationError::empty_field("city"));
        }
        match (&self.booking_url, self.redemption_mode) {
            (None, RedemptionMode::DirectBooking) => {
                return Err(ValidationError::empty_field("booking_url"));
            }
            (Some(url), _) if !(url.starts_with("https://") || url.starts_with("http://")) => {
                return Err(ValidationError::invalid_format(
                    "booking_url",
                    "must be an http(s) URL",
                ));
            }
            _ => {}
        }
        Ok(())
    }
}

/// A purchasable discount offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub salon_id: SalonId,
    pub title: String,
    pub description: String,
    pub price: PricePair,
    pub category: String,
    pub city: String,
    pub is_active: bool,
    pub approval: ApprovalStatus,
    pub booking_url: Option<String>,
    pub redemption_mode: RedemptionMode,
    pub views: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Deal {
    /// Creates a new active deal awaiting review.
    pub fn create(
        id: DealId,
        salon_id: SalonId,
        details: DealDetails,
        now: Timestamp,
    ) -> Result<Self, DealError> {
        details.validate()?;
        Ok(Self {
            id,
            salon_id,
            title: details.title.trim().to_string(),
            description: details.description,
            price: details.price,
            category: details.category.trim().to_string(),
            city: details.city.trim().to_string(),
            is_active: true,
            approval: ApprovalStatus::Pending,
            booking_url: details.booking_url,
            redemption_mode: details.redemption_mode,
            views: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies an edit. An approved deal goes back to review.
    pub fn update(&mut self, details: DealDetails, now: Timestamp) -> Result<(), DealError> {
        details.validate()?;
        self.title = details.title.trim().to_string();
        self.description = details.description;
        self.price = details.price;
        self.category = details.category.trim().to_string();
        self.city = details.city.trim().to_string();
        self.booking_url = details.booking_url;
        self.redemption_mode = details.redemption_mode;
        if self.approval == ApprovalStatus::Approved {
            self.approval = ApprovalStatus::Pending;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn set_active(&mut self, active: bool, now: Timestamp) {
        self.is_active = active;
        self.updated_at = now;
    }

    pub fn approve(&mut self, now: Timestamp) -> Result<(), DealError> {
        self.transition(ApprovalStatus::Approved, "approve", now)
    }

    pub fn reject(&mut self, now: Timestamp) -> Result<(), DealError> {
        self.transition(ApprovalStatus::Rejected, "reject", now)
    }

    fn transition(
        &mut self,
        target: ApprovalStatus,
        action: &str,
        now: Timestamp,
    ) -> Result<(), DealError> {
        self.approval = self
            .approval
            .transition_to(target)
            .map_err(|_| DealError::invalid_state(self.approval.as_str(), action))?;
        self.updated_at = now;
        Ok(())
    }

    /// Whether redemption hands out a discount code.
    pub fn requires_code(&self) -> bool {
        self.redemption_mode == RedemptionMode::DiscountCode
    }

    /// Whether a customer can redeem this deal for a code right now.
    pub fn is_redeemable(&self) -> bool {
        self.is_active && self.approval == ApprovalStatus::Approved && self.requires_code()
    }
}
