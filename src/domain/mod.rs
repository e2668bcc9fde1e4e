//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, state machine, errors)
//! - `salon` - Partner and admin accounts, the authorization boundary
//! - `deal` - Discount offers and their review lifecycle
//! - `codes` - Single-use discount codes, generation and usage state
//! - `redemption` - Customer contact validation and code delivery
//! - `reporting` - Read models for dashboards and the collaboration export

pub mod codes;
pub mod deal;
pub mod foundation;
pub mod redemption;
pub mod reporting;
pub mod salon;
