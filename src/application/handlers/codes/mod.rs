//! Discount code command and query handlers.
//!
//! Generation, allocation and the storefront redemption flow, free or paid.

mod allocate_code;
mod generate_codes;
mod handle_payment_webhook;
mod mark_code_used;
mod notification_dispatcher;
mod redeem_deal;
mod start_checkout;
mod validate_contact;

pub use allocate_code::{AllocateCodeHandler, AllocateCodeQuery};
pub use generate_codes::{GenerateCodesCommand, GenerateCodesHandler, GenerationSettings};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, WebhookError, WebhookOutcome,
};
pub use mark_code_used::{MarkCodeUsedCommand, MarkCodeUsedHandler};
pub use notification_dispatcher::{NotificationDispatcher, RetryPolicy};
pub use redeem_deal::{RedeemDealCommand, RedeemDealHandler, RedeemDealResult};
pub use start_checkout::{StartCheckoutCommand, StartCheckoutHandler};
pub use validate_contact::{ValidateContactHandler, ValidateContactQuery};
