//! HTTP handlers for pharmacy inventory endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use shared::{InventoryItem, InventoryItemPatch, NewInventoryItem};

use crate::error::AppResult;
use crate::services::{InventoryService, ReportingService};
use crate::AppState;

/// Create a pharmacy item
pub async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<NewInventoryItem>,
) -> AppResult<impl IntoResponse> {
    let service = InventoryService::new(&state.stores);
    let item = service.create_item(input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// List all pharmacy items, newest first
pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<Vec<InventoryItem>>> {
    let service = InventoryService::new(&state.stores);
    Ok(Json(service.list_items().await?))
}

/// Get a pharmacy item by id
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<InventoryItem>> {
    let service = InventoryService::new(&state.stores);
    Ok(Json(service.get_item(item_id).await?))
}

/// Update a pharmacy item
pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(patch): Json<InventoryItemPatch>,
) -> AppResult<Json<InventoryItem>> {
    let service = InventoryService::new(&state.stores);
    Ok(Json(service.update_item(item_id, patch).await?))
}

/// Delete a pharmacy item
pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = InventoryService::new(&state.stores);
    service.delete_item(item_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Item deleted successfully"
    })))
}

/// Items at or below their reorder level
pub async fn get_low_stock_items(State(state): State<AppState>) -> AppResult<Json<Vec<InventoryItem>>> {
    let service = ReportingService::new(&state.stores);
    Ok(Json(service.low_stock_items().await?))
}
