//! Sale ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::InventoryItem;
use crate::validation::{FieldViolation, MAX_SALE_PROFIT};

/// One entry of the sale ledger
///
/// Prices are copied from the inventory item when the sale is recorded and
/// are never edited afterwards, so later price changes on the item leave the
/// stored profit untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub id: Uuid,
    /// Weak reference; the item may have been deleted since
    pub pharmacy_item: Uuid,
    pub item_name: String,
    pub quantity_sold: i32,
    pub selling_price: Decimal,
    pub cost_price: Decimal,
    pub profit: Decimal,
    pub created_at: DateTime<Utc>,
}

impl SaleRecord {
    /// Snapshot an item's prices into a new sale
    ///
    /// Fails when the profit cannot be represented in the ledger.
    pub fn snapshot(
        item: &InventoryItem,
        quantity_sold: i32,
        now: DateTime<Utc>,
    ) -> Result<Self, FieldViolation> {
        let profit = compute_profit(item.selling_price, item.cost_price, quantity_sold)
            .ok_or_else(|| FieldViolation::new("quantitySold", "Sale value is too large to record"))?;

        Ok(Self {
            id: Uuid::new_v4(),
            pharmacy_item: item.id,
            item_name: item.item_name.clone(),
            quantity_sold,
            selling_price: item.selling_price,
            cost_price: item.cost_price,
            profit,
            created_at: now,
        })
    }
}

/// Profit of a sale: `(selling - cost) * quantity`
///
/// `None` on overflow or when the result is outside the ledger's
/// `NUMERIC(14,2)` range.
pub fn compute_profit(selling_price: Decimal, cost_price: Decimal, quantity_sold: i32) -> Option<Decimal> {
    selling_price
        .checked_sub(cost_price)?
        .checked_mul(Decimal::from(quantity_sold))
        .filter(|profit| profit.abs() <= MAX_SALE_PROFIT)
}

/// Request body for recording a sale
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSaleInput {
    pub pharmacy_item: Uuid,
    pub quantity_sold: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_compute_profit() {
        assert_eq!(compute_profit(dec("12.50"), dec("10.00"), 4), Some(dec("10.00")));
        // selling below cost is a loss, not an error
        assert_eq!(compute_profit(dec("8"), dec("10"), 3), Some(dec("-6")));
    }

    #[test]
    fn test_compute_profit_rejects_overflow() {
        assert_eq!(compute_profit(Decimal::MAX, Decimal::ZERO, 2), None);
        assert_eq!(compute_profit(Decimal::MAX, Decimal::MIN, 1), None);
        // representable in memory but not in the ledger column
        assert_eq!(compute_profit(dec("9999999999.99"), Decimal::ZERO, 1000), None);
        assert!(compute_profit(dec("9999999999.99"), Decimal::ZERO, 99).is_some());
    }
}
