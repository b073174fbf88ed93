//! Sale recording and reversal
//!
//! Keeps the sale ledger and inventory stock consistent. A sale decrements
//! stock with a conditional update before the ledger entry is written; if
//! the entry cannot be built or appended the decrement is compensated.
//! Deleting a sale removes it and restores its stock in one store operation.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use shared::{validate_quantity_sold, InventoryItem, RecordSaleInput, SaleRecord};

use crate::error::{AppError, AppResult};
use crate::store::{InventoryStore, SaleLedger, StockDecrement, Stores};

/// Sale-inventory coordinator
#[derive(Clone)]
pub struct SaleService {
    inventory: Arc<dyn InventoryStore>,
    sales: Arc<dyn SaleLedger>,
}

impl SaleService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            inventory: stores.inventory.clone(),
            sales: stores.sales.clone(),
        }
    }

    /// Record a sale of `quantity_sold` units, snapshotting the item's
    /// current prices into the ledger entry
    ///
    /// Not idempotent: every successful call removes stock.
    pub async fn record_sale(&self, input: RecordSaleInput) -> AppResult<SaleRecord> {
        let RecordSaleInput {
            pharmacy_item,
            quantity_sold,
        } = input;

        validate_quantity_sold(quantity_sold).map_err(|message| AppError::Validation {
            field: "quantitySold".to_string(),
            message: message.to_string(),
        })?;

        let item = match self.inventory.decrement_stock(pharmacy_item, quantity_sold).await? {
            StockDecrement::Applied(item) => item,
            StockDecrement::Insufficient { available } => {
                tracing::warn!(
                    item_id = %pharmacy_item,
                    requested = quantity_sold,
                    available,
                    "Sale rejected for insufficient stock"
                );
                return Err(AppError::InsufficientStock {
                    item: pharmacy_item,
                    requested: quantity_sold,
                    available,
                });
            }
            StockDecrement::Missing => return Err(AppError::NotFound("Item".to_string())),
        };

        let sale = match SaleRecord::snapshot(&item, quantity_sold, Utc::now()) {
            Ok(sale) => sale,
            Err(violation) => {
                tracing::warn!(
                    item_id = %item.id,
                    quantity = quantity_sold,
                    "Sale value out of range, restoring stock"
                );
                self.give_back(&item, quantity_sold).await;
                return Err(violation.into());
            }
        };

        match self.sales.append_sale(sale).await {
            Ok(sale) => {
                tracing::info!(
                    sale_id = %sale.id,
                    item_id = %item.id,
                    quantity = quantity_sold,
                    remaining = item.quantity_in_stock,
                    profit = %sale.profit,
                    "Sale recorded"
                );
                Ok(sale)
            }
            Err(err) => {
                tracing::error!(item_id = %item.id, error = %err, "Ledger append failed, restoring stock");
                self.give_back(&item, quantity_sold).await;
                Err(err)
            }
        }
    }

    /// Delete a sale and put its units back into stock
    ///
    /// If the item has been deleted in the meantime there is nothing to
    /// restore and the sale is removed anyway.
    pub async fn delete_sale(&self, sale_id: Uuid) -> AppResult<()> {
        let removed = self
            .sales
            .remove_sale(sale_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let sale = &removed.sale;
        match &removed.restored {
            Some(item) => tracing::info!(
                sale_id = %sale.id,
                item_id = %item.id,
                quantity = sale.quantity_sold,
                stock = item.quantity_in_stock,
                "Sale deleted"
            ),
            None => tracing::warn!(
                sale_id = %sale.id,
                item_id = %sale.pharmacy_item,
                "Sale referenced a deleted item, stock not restored"
            ),
        }
        Ok(())
    }

    async fn give_back(&self, item: &InventoryItem, quantity: i32) {
        if let Err(err) = self.inventory.restore_stock(item.id, quantity).await {
            tracing::error!(item_id = %item.id, quantity, error = %err, "Failed to restore stock");
        }
    }
}
