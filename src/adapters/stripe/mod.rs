//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port for paid deals:
//! - One-off Checkout Sessions priced from the deal
//! - Webhook signature verification
//!
//! # Security
//!
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//! - Timestamps are validated to prevent replay attacks (5-minute window)
//! - All secrets are handled via `secrecy::SecretString`

mod mock_payment_provider;
mod stripe_adapter;
mod webhook_types;

pub use mock_payment_provider::MockPaymentProvider;
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};
pub use webhook_types::{
    SignatureHeader, SignatureParseError, StripeCheckoutSession, StripeWebhookEvent,
};
