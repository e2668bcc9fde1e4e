//! Salon module - the partner entity that owns deals and their code pools.
//!
//! Salons are the authorization boundary for code generation and dashboard
//! queries: an admin may act on any deal, a salon only on deals it owns.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SalonId, Timestamp};

/// Role of a salon account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalonRole {
    /// Back-office administrator.
    Admin,
    /// Salon partner.
    Salon,
}

impl SalonRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalonRole::Admin => "admin",
            SalonRole::Salon => "salon",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(SalonRole::Admin),
            "salon" => Some(SalonRole::Salon),
            _ => None,
        }
    }
}

/// Partner subscription state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    Trial,
    Active,
    PastDue,
    Cancelled,
}

impl SubscriptionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionState::Trial => "trial",
            SubscriptionState::Active => "active",
            SubscriptionState::PastDue => "past_due",
            SubscriptionState::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trial" => Some(SubscriptionState::Trial),
            "active" => Some(SubscriptionState::Active),
            "past_due" => Some(SubscriptionState::PastDue),
            "cancelled" => Some(SubscriptionState::Cancelled),
            _ => None,
        }
    }
}

/// A salon account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salon {
    pub id: SalonId,
    pub name: String,
    pub contact_email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: SalonRole,
    pub subscription: SubscriptionState,
    pub created_at: Timestamp,
}

impl Salon {
    /// Creates a salon partner account on a trial subscription.
    pub fn new_partner(id: SalonId, name: impl Into<String>, contact_email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            contact_email: contact_email.into(),
            phone: None,
            address: None,
            role: SalonRole::Salon,
            subscription: SubscriptionState::Trial,
            created_at: Timestamp::now(),
        }
    }

    /// Creates an admin account.
    pub fn new_admin(id: SalonId, name: impl Into<String>, contact_email: impl Into<String>) -> Self {
        Self {
            role: SalonRole::Admin,
            subscription: SubscriptionState::Active,
            ..Self::new_partner(id, name, contact_email)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == SalonRole::Admin
    }

    /// Whether this account may manage resources owned by `owner`.
    pub fn can_manage(&self, owner: &SalonId) -> bool {
        self.is_admin() || &self.id == owner
    }
}
