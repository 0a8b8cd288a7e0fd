//! Order API Handlers

use axum::Json;
use axum::extract::State;
use http::StatusCode;
use shared::error::AppResult;
use shared::models::CreateOrderRequest;
use shared::response::ApiResponse;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::Order;

/// POST /products/orders
///
/// Prices every line from the stored product and persists the order in one
/// insert; nothing is written when any product fails to resolve.
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(request): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, ApiResponse<Order>)> {
    let lines = request.items.len();
    let order = state.orders().create_order(&current_user.id, request).await?;

    tracing::info!(
        user_id = %current_user.id,
        lines,
        total_amount = order.total_amount,
        total_discount = order.total_discount,
        "Order created"
    );

    Ok((StatusCode::CREATED, ApiResponse::success(order)))
}
