//! HTTP handlers for inventory item endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::models::{InventoryItem, NewItem};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::CurrentUser;
use crate::services::InventoryService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ItemFilter {
    pub category: Option<String>,
}

/// Register an item
pub async fn register_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(input): AppJson<NewItem>,
) -> AppResult<(StatusCode, Json<InventoryItem>)> {
    let service = InventoryService::new(state.store);
    let item = service.register_item(&current_user.0, input)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Get a single item
pub async fn get_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<InventoryItem>> {
    let service = InventoryService::new(state.store);
    let item = service.get_item(&current_user.0, item_id)?;
    Ok(Json(item))
}

/// List items, optionally by category
pub async fn list_items(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ItemFilter>,
) -> AppResult<Json<Vec<InventoryItem>>> {
    let service = InventoryService::new(state.store);
    let items = service.list_items(&current_user.0, filter.category.as_deref())?;
    Ok(Json(items))
}

/// Items at or below their restock threshold
pub async fn low_stock_items(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<InventoryItem>>> {
    let service = InventoryService::new(state.store);
    let items = service.low_stock_items(&current_user.0)?;
    Ok(Json(items))
}
