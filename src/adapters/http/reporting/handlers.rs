//! HTTP handlers for reporting endpoints.

use axum::extract::{Json, Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::adapters::http::codes::CodeApiError;
use crate::adapters::http::middleware::RequireSalon;
use crate::adapters::http::AppState;
use crate::application::handlers::{
    ExportCollaborationsQuery, GetCodeStatsQuery, ListRedemptionsQuery,
};
use crate::domain::foundation::{DealId, Timestamp};
use crate::domain::reporting::RedemptionFilter;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportParams {
    /// Export date written into the CSV; defaults to today (UTC).
    pub date: Option<NaiveDate>,
}

/// GET /api/deals/:id/codes/stats - Pool size and usage for a deal
pub async fn get_code_stats(
    State(state): State<AppState>,
    RequireSalon(actor): RequireSalon,
    Path(deal_id): Path<DealId>,
) -> Result<impl IntoResponse, CodeApiError> {
    let stats = state
        .code_stats_handler()
        .handle(GetCodeStatsQuery { deal_id, actor })
        .await?;

    Ok(Json(stats))
}

/// GET /api/redemptions - Used codes with customer details, newest first
pub async fn list_redemptions(
    State(state): State<AppState>,
    RequireSalon(actor): RequireSalon,
    Query(filter): Query<RedemptionFilter>,
) -> Result<impl IntoResponse, CodeApiError> {
    let records = state
        .list_redemptions_handler()
        .handle(ListRedemptionsQuery { filter, actor })
        .await?;

    Ok(Json(records))
}

/// GET /api/admin/collaborations/export - Collaboration overview as CSV
pub async fn export_collaborations(
    State(state): State<AppState>,
    RequireSalon(actor): RequireSalon,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, CodeApiError> {
    let date = params.date.unwrap_or_else(|| Timestamp::now().date());
    let export = state
        .export_collaborations_handler()
        .handle(ExportCollaborationsQuery { date, actor })
        .await?;

    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.content,
    ))
}
