//! Pharmacy inventory management

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use shared::{validate_inventory_item, InventoryItem, InventoryItemPatch, NewInventoryItem};

use crate::error::{AppError, AppResult};
use crate::store::{InventoryStore, Stores};

/// Inventory service for stock-keeping records
#[derive(Clone)]
pub struct InventoryService {
    inventory: Arc<dyn InventoryStore>,
}

impl InventoryService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            inventory: stores.inventory.clone(),
        }
    }

    /// Create an item; the batch number must be unused
    pub async fn create_item(&self, input: NewInventoryItem) -> AppResult<InventoryItem> {
        let item = InventoryItem::from_new(input, Utc::now());
        validate_inventory_item(&item)?;

        let item = self.inventory.insert_item(item).await?;
        tracing::info!(item_id = %item.id, batch = %item.batch_number, "Inventory item created");
        Ok(item)
    }

    /// All items, newest first
    pub async fn list_items(&self) -> AppResult<Vec<InventoryItem>> {
        self.inventory.list_items().await
    }

    pub async fn get_item(&self, id: Uuid) -> AppResult<InventoryItem> {
        self.inventory
            .find_item(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".to_string()))
    }

    /// Apply a partial update and re-validate the whole record
    pub async fn update_item(&self, id: Uuid, patch: InventoryItemPatch) -> AppResult<InventoryItem> {
        let item = self
            .inventory
            .update_item(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        tracing::info!(item_id = %item.id, stock = item.quantity_in_stock, "Inventory item updated");
        Ok(item)
    }

    /// Remove an item. Sales that reference it keep their snapshot.
    pub async fn delete_item(&self, id: Uuid) -> AppResult<InventoryItem> {
        let item = self
            .inventory
            .delete_item(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        tracing::info!(item_id = %item.id, "Inventory item deleted");
        Ok(item)
    }
}
