//! Codes module - single-use discount codes and their pools.
//!
//! Each deal owns a pool of codes. Codes are generated in batches, claimed
//! one at a time for a customer and never reused.

mod code_value;
mod discount_code;
mod errors;
mod generation;

pub use code_value::{generate_unique, CodeValue, CODE_ALPHABET, CODE_LENGTH};
pub use discount_code::{CodeStatus, DiscountCode};
pub use errors::CodeError;
pub use generation::{
    GenerationJob, GenerationOutcome, GenerationPlan, GenerationStart, GENERATION_LEASE_SECS,
    MAX_QUANTITY,
};
