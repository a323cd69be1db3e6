use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::dto::{BoardResponse, CreateOrderRequest, MessageResponse, OrderResponse, OrdersResponse, StatusUpdateRequest};
use super::{ApiError, AppState};

pub async fn list_orders(State(state): State<AppState>) -> Result<Json<OrdersResponse>, ApiError> {
    let orders = state.orders.list_orders().await?;
    Ok(Json(OrdersResponse { success: true, orders }))
}

pub async fn orders_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> Result<Json<OrdersResponse>, ApiError> {
    let orders = state.orders.list_by_status(&status).await?;
    Ok(Json(OrdersResponse { success: true, orders }))
}

pub async fn board(State(state): State<AppState>) -> Result<Json<BoardResponse>, ApiError> {
    let (preparing, serving) = state.orders.board().await?;
    Ok(Json(BoardResponse {
        success: true,
        preparing,
        serving,
    }))
}

/// `key` is the numeric id or the order number.
pub async fn get_order(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.orders.find_order(key).await?;
    Ok(Json(OrderResponse { success: true, order }))
}

pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let Json(request) = payload?;
    let order = state.orders.create_order(request.into()).await?;
    Ok((StatusCode::CREATED, Json(OrderResponse { success: true, order })))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, ApiError> {
    let Json(request) = payload?;
    let order = state.orders.set_status(key, &request.status).await?;
    Ok(Json(OrderResponse { success: true, order }))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = state.orders.delete_order(key).await?;
    Ok(Json(MessageResponse::ok(format!("Order {} deleted", removed.order_number))))
}

pub async fn reset(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    let removed = state.orders.reset_session().await?;
    Ok(Json(MessageResponse::ok(format!("Cleared {} orders", removed))))
}
