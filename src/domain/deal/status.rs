//! Deal approval status and redemption mode.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Back-office review state of a deal.
///
/// ```text
/// Pending ──approve──► Approved
///    │ ▲                  │
/// reject│ └──resubmit/edit──┘
///    ▼ │
/// Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(ApprovalStatus::Pending),
            "approved" => Some(ApprovalStatus::Approved),
            "rejected" => Some(ApprovalStatus::Rejected),
            _ => None,
        }
    }
}

impl StateMachine for ApprovalStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            ApprovalStatus::Pending => vec![ApprovalStatus::Approved, ApprovalStatus::Rejected],
            ApprovalStatus::Approved => vec![ApprovalStatus::Pending],
            ApprovalStatus::Rejected => vec![ApprovalStatus::Pending],
        }
    }
}

/// How a customer redeems the deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionMode {
    /// Customer receives a single-use discount code.
    #[default]
    DiscountCode,
    /// Customer books directly through the salon's booking URL.
    DirectBooking,
}

impl RedemptionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedemptionMode::DiscountCode => "discount_code",
            RedemptionMode::DirectBooking => "direct_booking",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "discount_code" => Some(RedemptionMode::DiscountCode),
            "direct_booking" => Some(RedemptionMode::DirectBooking),
            _ => None,
        }
    }
}
