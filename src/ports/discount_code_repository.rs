//! Discount code repository port.
//!
//! The code table is the only shared mutable resource of the redemption
//! workflow. Every consumption goes through `mark_used` or `claim`, both of
//! which flip `used` with a single conditional write so a code can never be
//! handed to two customers.
//!
//! # Storage guarantees
//!
//! - Code values are unique across all deals
//! - Among used codes, `(deal_id, email)` and `(deal_id, phone)` are unique

use crate::domain::codes::{CodeValue, DiscountCode, GenerationStart};
use crate::domain::foundation::{DealId, DomainError, Timestamp};
use crate::domain::redemption::{ContactRejection, CustomerInfo, EmailAddress, PhoneNumber};
use async_trait::async_trait;

/// Result of consuming a specific code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkUsedOutcome {
    Marked(DiscountCode),
    NotFound,
    AlreadyUsed,
    /// The customer already holds a code for this deal.
    ContactTaken(ContactRejection),
}

/// Result of atomically claiming the next free code of a deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed(DiscountCode),
    /// No unused code is left.
    Exhausted,
    /// The customer already holds a code for this deal.
    ContactTaken(ContactRejection),
}

/// Repository port for the per-deal code pools.
#[async_trait]
pub trait DiscountCodeRepository: Send + Sync {
    /// Number of codes (used or not) that belong to a deal.
    async fn count_for_deal(&self, deal_id: &DealId) -> Result<u64, DomainError>;

    /// Decide whether a generation run may fill the deal's pool and take its
    /// job lease when it may.
    ///
    /// The check for existing codes and the creation of the job happen in one
    /// atomic step, so two concurrent runs never both see `Fresh`.
    async fn start_generation(
        &self,
        deal_id: &DealId,
        requested: u32,
        now: Timestamp,
        lease_until: Timestamp,
    ) -> Result<GenerationStart, DomainError>;

    /// Release the lease taken by `start_generation`. `completed_at` marks
    /// the pool as filled; `None` leaves the job open for a later top-up.
    async fn finish_generation(
        &self,
        deal_id: &DealId,
        completed_at: Option<Timestamp>,
    ) -> Result<(), DomainError>;

    /// Insert a batch of codes in one statement.
    ///
    /// # Errors
    ///
    /// - `DuplicateCode` if any value already exists
    /// - `DatabaseError` on persistence failure
    async fn insert_batch(&self, codes: &[DiscountCode]) -> Result<(), DomainError>;

    /// Peek one unused code without reserving it.
    async fn find_unused(&self, deal_id: &DealId) -> Result<Option<DiscountCode>, DomainError>;

    /// Look up a code by value.
    async fn find_by_code(&self, code: &CodeValue) -> Result<Option<DiscountCode>, DomainError>;

    /// Compare-and-swap a specific code from unused to used.
    async fn mark_used(
        &self,
        code: &CodeValue,
        customer: &CustomerInfo,
        used_at: Timestamp,
    ) -> Result<MarkUsedOutcome, DomainError>;

    /// Select the first unused code of a deal and bind it to `customer` in
    /// one atomic step.
    async fn claim(
        &self,
        deal_id: &DealId,
        customer: &CustomerInfo,
        used_at: Timestamp,
    ) -> Result<ClaimOutcome, DomainError>;

    /// Whether this email or phone already holds a used code of the deal.
    ///
    /// Email is checked first.
    async fn find_contact_conflict(
        &self,
        deal_id: &DealId,
        email: &EmailAddress,
        phone: &PhoneNumber,
    ) -> Result<Option<ContactRejection>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_code_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn DiscountCodeRepository) {}
    }
}
