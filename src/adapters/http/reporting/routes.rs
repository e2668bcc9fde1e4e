//! Route configuration for reporting endpoints.

use axum::routing::get;
use axum::Router;

use crate::adapters::http::AppState;

use super::handlers::{export_collaborations, get_code_stats, list_redemptions};

/// Creates the reporting router.
///
/// Routes:
/// - `GET /api/deals/:id/codes/stats` - Code pool statistics (owner or admin)
/// - `GET /api/redemptions` - Redemption listing (salons see their own)
/// - `GET /api/admin/collaborations/export` - Collaboration CSV (admin)
pub fn reporting_router() -> Router<AppState> {
    Router::new()
        .route("/api/deals/:id/codes/stats", get(get_code_stats))
        .route("/api/redemptions", get(list_redemptions))
        .route("/api/admin/collaborations/export", get(export_collaborations))
}
