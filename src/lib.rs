//! Salon Deals - discount-code issuance and redemption backend
//!
//! Salons publish deals, fill each deal with a pool of single-use discount
//! codes, and customers claim a code from the storefront (free) or after a
//! Stripe checkout (paid). The code is emailed and counted in the salon and
//! back-office reports.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
