//! Pharmacy inventory models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stock-keeping record in the pharmacy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub item_name: String,
    pub category: String,
    /// Never negative after a committed operation
    pub quantity_in_stock: i32,
    pub reorder_level: i32,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    /// Unique across the inventory
    pub batch_number: String,
    pub expiry_date: DateTime<Utc>,
    pub supplier: String,
    pub purchase_date: DateTime<Utc>,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Build a new record from validated input
    pub fn from_new(input: NewInventoryItem, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_name: input.item_name.trim().to_string(),
            category: input.category.trim().to_string(),
            quantity_in_stock: input.quantity_in_stock,
            reorder_level: input.reorder_level,
            cost_price: input.cost_price,
            selling_price: input.selling_price,
            batch_number: input.batch_number.trim().to_string(),
            expiry_date: input.expiry_date,
            supplier: input.supplier.trim().to_string(),
            purchase_date: input.purchase_date,
            location: input.location.trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// An item is low on stock once it reaches its reorder level
    pub fn is_low_stock(&self) -> bool {
        self.quantity_in_stock <= self.reorder_level
    }

    /// Apply a partial update; fields absent from the patch are kept
    pub fn apply(&mut self, patch: InventoryItemPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.item_name {
            self.item_name = v.trim().to_string();
        }
        if let Some(v) = patch.category {
            self.category = v.trim().to_string();
        }
        if let Some(v) = patch.quantity_in_stock {
            self.quantity_in_stock = v;
        }
        if let Some(v) = patch.reorder_level {
            self.reorder_level = v;
        }
        if let Some(v) = patch.cost_price {
            self.cost_price = v;
        }
        if let Some(v) = patch.selling_price {
            self.selling_price = v;
        }
        if let Some(v) = patch.batch_number {
            self.batch_number = v.trim().to_string();
        }
        if let Some(v) = patch.expiry_date {
            self.expiry_date = v;
        }
        if let Some(v) = patch.supplier {
            self.supplier = v.trim().to_string();
        }
        if let Some(v) = patch.purchase_date {
            self.purchase_date = v;
        }
        if let Some(v) = patch.location {
            self.location = v.trim().to_string();
        }
        self.updated_at = now;
    }
}

/// Input for creating an inventory item
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    pub item_name: String,
    pub category: String,
    pub quantity_in_stock: i32,
    pub reorder_level: i32,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub batch_number: String,
    pub expiry_date: DateTime<Utc>,
    pub supplier: String,
    pub purchase_date: DateTime<Utc>,
    pub location: String,
}

/// Partial update of an inventory item
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemPatch {
    pub item_name: Option<String>,
    pub category: Option<String>,
    pub quantity_in_stock: Option<i32>,
    pub reorder_level: Option<i32>,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub supplier: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
}
