use crate::errors::ServiceError;
use crate::services::reports::{MovementTotalsRow, StockOverviewRow};
use crate::{ApiResponse, AppState};
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};

/// Create the dashboard router
pub fn dashboard_router() -> Router<AppState> {
    Router::new()
        .route("/stock", get(get_stock_overview))
        .route("/movements", get(get_movement_totals))
}

/// Stock level per product classified against its limits
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stock",
    responses(
        (status = 200, description = "Stock overview", body = [StockOverviewRow]),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse)
    ),
    tag = "dashboard"
)]
pub async fn get_stock_overview(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = state.dashboard_service.stock_overview().await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// Total moved-in/out quantity per product
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/movements",
    responses(
        (status = 200, description = "Movement totals", body = [MovementTotalsRow]),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse)
    ),
    tag = "dashboard"
)]
pub async fn get_movement_totals(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = state.dashboard_service.movement_totals().await?;
    Ok(Json(ApiResponse::success(rows)))
}
