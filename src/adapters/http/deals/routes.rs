//! Route configuration for deal endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::adapters::http::AppState;

use super::handlers::{
    create_deal, delete_deal, get_deal, list_my_deals, record_view, review_deal, update_deal,
};

/// Creates the deal router.
///
/// Routes:
/// - `POST /api/deals` - Create a deal (salon)
/// - `GET /api/deals/:id` - Deal page (public; owners see unpublished)
/// - `PUT /api/deals/:id` - Edit a deal (owner or admin)
/// - `DELETE /api/deals/:id` - Delete a deal without codes (owner or admin)
/// - `POST /api/deals/:id/views` - Count a page view (public)
/// - `GET /api/salons/me/deals` - The caller's deals (salon)
/// - `POST /api/admin/deals/:id/review` - Approve or reject (admin)
pub fn deals_router() -> Router<AppState> {
    Router::new()
        .route("/api/deals", post(create_deal))
        .route(
            "/api/deals/:id",
            get(get_deal).put(update_deal).delete(delete_deal),
        )
        .route("/api/deals/:id/views", post(record_view))
        .route("/api/salons/me/deals", get(list_my_deals))
        .route("/api/admin/deals/:id/review", post(review_deal))
}
