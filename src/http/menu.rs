use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::domain::{MenuItemCreate, MenuItemPatch};

use super::dto::{MenuItemResponse, MenuItemsResponse, MenuQuery, MessageResponse};
use super::{ApiError, AppState};

pub async fn list_items(
    State(state): State<AppState>,
    query: Result<Query<MenuQuery>, QueryRejection>,
) -> Result<Json<MenuItemsResponse>, ApiError> {
    let Query(query) = query?;
    let items = match query.category {
        Some(category) => state.menu.by_category(&category).await?,
        None => state.menu.list_menu(None).await?,
    };
    Ok(Json(MenuItemsResponse { success: true, items }))
}

pub async fn items_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<MenuItemsResponse>, ApiError> {
    let items = state.menu.by_category(&category).await?;
    Ok(Json(MenuItemsResponse { success: true, items }))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MenuItemResponse>, ApiError> {
    let item = state.menu.find_menu_item(id).await?;
    Ok(Json(MenuItemResponse { success: true, item }))
}

pub async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<MenuItemCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<MenuItemResponse>), ApiError> {
    let Json(item) = payload?;
    let item = state.menu.create_menu_item(item).await?;
    Ok((StatusCode::CREATED, Json(MenuItemResponse { success: true, item })))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MenuItemPatch>, JsonRejection>,
) -> Result<Json<MenuItemResponse>, ApiError> {
    let Json(patch) = payload?;
    let item = state.menu.update_menu_item(id, patch).await?;
    Ok(Json(MenuItemResponse { success: true, item }))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = state.menu.delete_menu_item(id).await?;
    Ok(Json(MessageResponse::ok(format!("Menu item {} deleted", removed.name))))
}
