//! Route configuration for discount code endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::adapters::http::AppState;

use super::handlers::{
    generate_codes, handle_stripe_webhook, mark_code_used, next_code, redeem_deal,
    start_checkout, validate_contact,
};

/// Creates the code router.
///
/// Routes:
/// - `POST /api/deals/:id/redeem` - Claim a code (public)
/// - `POST /api/deals/:id/validate-contact` - Pre-check contact details (public)
/// - `POST /api/deals/:id/checkout` - Start paid checkout (public)
/// - `POST /api/deals/:id/codes` - Generate the code pool (owner or admin)
/// - `GET /api/admin/deals/:id/codes/next` - Peek at the next unused code (owner or admin)
/// - `POST /api/admin/codes/:code/use` - Register a manually issued code (owner or admin)
/// - `POST /api/webhooks/stripe` - Payment provider callbacks (signature verified)
pub fn codes_router() -> Router<AppState> {
    Router::new()
        .route("/api/deals/:id/redeem", post(redeem_deal))
        .route("/api/deals/:id/validate-contact", post(validate_contact))
        .route("/api/deals/:id/checkout", post(start_checkout))
        .route("/api/deals/:id/codes", post(generate_codes))
        .route("/api/admin/deals/:id/codes/next", get(next_code))
        .route("/api/admin/codes/:code/use", post(mark_code_used))
        .route("/api/webhooks/stripe", post(handle_stripe_webhook))
}
