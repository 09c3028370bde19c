use crate::auth::AuthUser;
use crate::entities::inventory_movement::MovementType;
use crate::errors::ServiceError;
use crate::services::inventory::{MovementEntry, RecordMovement};
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Request body for a stock entry or exit. The acting user is always the
/// authenticated principal, never a request field.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StockChangeRequest {
    /// Identifier of the affected product (typed in or read from a barcode)
    pub product_id: i64,
    /// Positive magnitude of the change; the direction comes from the route
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// Create the inventory router
pub fn inventory_router() -> Router<AppState> {
    Router::new()
        .route("/entries", post(record_entry))
        .route("/exits", post(record_exit))
        .route("/movements", get(list_movements))
        .route("/movements/{id}/revert", post(revert_movement))
}

/// Record a stock entry for a product
#[utoipa::path(
    post,
    path = "/api/v1/inventory/entries",
    request_body = StockChangeRequest,
    responses(
        (status = 201, description = "Movement recorded"),
        (status = 400, description = "Invalid quantity", body = crate::errors::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product or unprovisioned user", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn record_entry(
    State(state): State<AppState>,
    principal: AuthUser,
    Json(request): Json<StockChangeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    record(state, principal, request, MovementType::In).await
}

/// Record a stock exit for a product
#[utoipa::path(
    post,
    path = "/api/v1/inventory/exits",
    request_body = StockChangeRequest,
    responses(
        (status = 201, description = "Movement recorded"),
        (status = 400, description = "Invalid quantity", body = crate::errors::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product or unprovisioned user", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn record_exit(
    State(state): State<AppState>,
    principal: AuthUser,
    Json(request): Json<StockChangeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    record(state, principal, request, MovementType::Out).await
}

async fn record(
    state: AppState,
    principal: AuthUser,
    request: StockChangeRequest,
    movement_type: MovementType,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;

    let movement = state
        .inventory_service
        .record_movement(RecordMovement {
            product_id: request.product_id,
            movement_type,
            quantity: request.quantity,
            user_id: principal.user_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(movement)),
    ))
}

/// Movement log ordered most recent first, with usernames and product names
#[utoipa::path(
    get,
    path = "/api/v1/inventory/movements",
    responses(
        (status = 200, description = "Movement log page", body = [MovementEntry]),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (entries, total) = state
        .inventory_service
        .list_movements(query.page, query.limit)
        .await?;

    let total_pages = total.div_ceil(query.limit);
    Ok(Json(ApiResponse::success(PaginatedResponse {
        items: entries,
        total,
        page: query.page,
        limit: query.limit,
        total_pages,
    })))
}

/// Revert a previously recorded movement
#[utoipa::path(
    post,
    path = "/api/v1/inventory/movements/{id}/revert",
    params(("id" = i64, Path, description = "Movement id")),
    responses(
        (status = 200, description = "Movement reverted"),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown movement", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn revert_movement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.inventory_service.revert_movement(id).await?;
    Ok(Json(ApiResponse::success(serde_json::json!({
        "reverted": id
    }))))
}
