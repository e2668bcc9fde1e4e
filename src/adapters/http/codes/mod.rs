//! HTTP adapter for discount code endpoints.
//!
//! Exposes code issuance and redemption via REST API:
//! - `POST /api/deals/:id/redeem` - Claim a code and email it
//! - `POST /api/deals/:id/validate-contact` - Pre-check email and phone
//! - `POST /api/deals/:id/checkout` - Start paid checkout
//! - `POST /api/deals/:id/codes` - Generate the code pool
//! - `GET /api/admin/deals/:id/codes/next` - Next unused code
//! - `POST /api/admin/codes/:code/use` - Register a manually issued code
//! - `POST /api/webhooks/stripe` - Handle Stripe webhooks

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{CodeApiError, WebhookApiError};
pub use routes::codes_router;
