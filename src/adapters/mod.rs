//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Access token validation
//! - `postgres` - Deal, salon and code storage
//! - `memory` - In-process storage for tests and local runs
//! - `stripe` - Hosted checkout and webhook verification
//! - `email` - Transactional email delivery
//! - `http` - Axum REST API

pub mod auth;
pub mod email;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
