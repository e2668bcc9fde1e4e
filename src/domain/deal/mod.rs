//! Deal module - purchasable discount offers.
//!
//! A deal is owned by exactly one salon, goes through back-office review and
//! is redeemable only while active, approved and in discount-code mode.

mod aggregate;
mod errors;
mod status;

pub use aggregate::{Deal, DealDetails, PricePair};
pub use errors::DealError;
pub use status::{ApprovalStatus, RedemptionMode};

#[cfg(test)]
pub(crate) use aggregate::test_support;
