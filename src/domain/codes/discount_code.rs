//! Discount code entity.

use serde::{Deserialize, Serialize};

use super::code_value::CodeValue;
use super::errors::CodeError;
use crate::domain::foundation::{DealId, DiscountCodeId, Timestamp};
use crate::domain::redemption::CustomerInfo;

/// Usage state of a code. A used code always carries who used it and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CodeStatus {
    Unused,
    Used {
        used_at: Timestamp,
        customer: CustomerInfo,
    },
}

/// A single-use discount code belonging to one deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountCode {
    pub id: DiscountCodeId,
    pub code: CodeValue,
    pub deal_id: DealId,
    pub status: CodeStatus,
    pub created_at: Timestamp,
}

impl DiscountCode {
    /// Creates a fresh unused code.
    pub fn new(deal_id: DealId, code: CodeValue, now: Timestamp) -> Self {
        Self {
            id: DiscountCodeId::new(),
            code,
            deal_id,
            status: CodeStatus::Unused,
            created_at: now,
        }
    }

    pub fn is_used(&self) -> bool {
        matches!(self.status, CodeStatus::Used { .. })
    }

    pub fn customer(&self) -> Option<&CustomerInfo> {
        match &self.status {
            CodeStatus::Unused => None,
            CodeStatus::Used { customer, .. } => Some(customer),
        }
    }

    pub fn used_at(&self) -> Option<Timestamp> {
        match &self.status {
            CodeStatus::Unused => None,
            CodeStatus::Used { used_at, .. } => Some(*used_at),
        }
    }

    /// Consumes the code for `customer`. A code can be used once.
    pub fn use_for(&mut self, customer: CustomerInfo, now: Timestamp) -> Result<(), CodeError> {
        if self.is_used() {
            return Err(CodeError::already_used(self.code.as_str()));
        }
        self.status = CodeStatus::Used {
            used_at: now,
            customer,
        };
        Ok(())
    }
}
