//! HTTP handlers for deal endpoints.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::adapters::http::error::ErrorResponse;
use crate::adapters::http::middleware::{OptionalSalon, RequireSalon};
use crate::adapters::http::AppState;
use crate::application::handlers::{
    CreateDealCommand, DeleteDealCommand, GetDealQuery, ListDealsQuery, ReviewDealCommand,
    UpdateDealCommand,
};
use crate::domain::deal::DealError;
use crate::domain::foundation::DealId;

use super::dto::{DealRequest, DealResponse, ListDealsParams, ReviewRequest};

/// POST /api/deals - Create a deal for the calling salon
pub async fn create_deal(
    State(state): State<AppState>,
    RequireSalon(actor): RequireSalon,
    Json(request): Json<DealRequest>,
) -> Result<impl IntoResponse, DealApiError> {
    let cmd = CreateDealCommand {
        details: request.details()?,
        salon_id: request.salon_id,
        actor,
    };

    let deal = state.create_deal_handler().handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(DealResponse::from(deal))))
}

/// GET /api/deals/:id - Public deal page; owners also see unpublished deals
pub async fn get_deal(
    State(state): State<AppState>,
    OptionalSalon(viewer): OptionalSalon,
    Path(deal_id): Path<DealId>,
) -> Result<impl IntoResponse, DealApiError> {
    let deal = state
        .get_deal_handler()
        .handle(GetDealQuery { deal_id, viewer })
        .await?;

    Ok(Json(DealResponse::from(deal)))
}

/// PUT /api/deals/:id - Edit a deal
pub async fn update_deal(
    State(state): State<AppState>,
    RequireSalon(actor): RequireSalon,
    Path(deal_id): Path<DealId>,
    Json(request): Json<DealRequest>,
) -> Result<impl IntoResponse, DealApiError> {
    let cmd = UpdateDealCommand {
        deal_id,
        details: request.details()?,
        is_active: request.is_active,
        actor,
    };

    let deal = state.update_deal_handler().handle(cmd).await?;

    Ok(Json(DealResponse::from(deal)))
}

/// DELETE /api/deals/:id - Delete a deal that never issued codes
pub async fn delete_deal(
    State(state): State<AppState>,
    RequireSalon(actor): RequireSalon,
    Path(deal_id): Path<DealId>,
) -> Result<impl IntoResponse, DealApiError> {
    state
        .delete_deal_handler()
        .handle(DeleteDealCommand { deal_id, actor })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/salons/me/deals - The calling salon's deals
pub async fn list_my_deals(
    State(state): State<AppState>,
    RequireSalon(actor): RequireSalon,
    Query(params): Query<ListDealsParams>,
) -> Result<impl IntoResponse, DealApiError> {
    let deals = state
        .list_deals_handler()
        .handle(ListDealsQuery {
            salon_id: params.salon_id,
            actor,
        })
        .await?;

    let body: Vec<DealResponse> = deals.into_iter().map(DealResponse::from).collect();
    Ok(Json(body))
}

/// POST /api/admin/deals/:id/review - Approve or reject a deal
pub async fn review_deal(
    State(state): State<AppState>,
    RequireSalon(actor): RequireSalon,
    Path(deal_id): Path<DealId>,
    Json(request): Json<ReviewRequest>,
) -> Result<impl IntoResponse, DealApiError> {
    let cmd = ReviewDealCommand {
        deal_id,
        decision: request.decision,
        actor,
    };

    let deal = state.review_deal_handler().handle(cmd).await?;

    Ok(Json(DealResponse::from(deal)))
}

/// POST /api/deals/:id/views - Count a storefront page view
pub async fn record_view(
    State(state): State<AppState>,
    Path(deal_id): Path<DealId>,
) -> Result<impl IntoResponse, DealApiError> {
    state.record_view_handler().handle(deal_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts deal errors to HTTP responses.
#[derive(Debug)]
pub struct DealApiError(pub DealError);

impl From<DealError> for DealApiError {
    fn from(err: DealError) -> Self {
        Self(err)
    }
}

impl IntoResponse for DealApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DealError::NotFound(_) => StatusCode::NOT_FOUND,
            DealError::Forbidden { .. } => StatusCode::FORBIDDEN,
            DealError::InvalidState { .. } | DealError::HasCodes(_) => StatusCode::CONFLICT,
            DealError::NotRedeemable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DealError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            DealError::Infrastructure(msg) => {
                tracing::error!(error = %msg, "Deal request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match &self.0 {
            DealError::ValidationFailed { field, .. } => ErrorResponse::with_details(
                self.0.code().to_string(),
                self.0.message(),
                serde_json::json!({ "field": field }),
            ),
            _ => ErrorResponse::new(self.0.code().to_string(), self.0.message()),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deal_errors_map_to_statuses() {
        let id = DealId::new();
        let cases = [
            (DealError::not_found(id), StatusCode::NOT_FOUND),
            (DealError::has_codes(id), StatusCode::CONFLICT),
            (DealError::invalid_state("approved", "approve"), StatusCode::CONFLICT),
            (DealError::validation("title", "empty"), StatusCode::BAD_REQUEST),
            (DealError::infrastructure("down"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(DealApiError(err).into_response().status(), expected);
        }
    }
}
