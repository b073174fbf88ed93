//! Reporting service for sales analytics and data export
//! Read-only rollups over the sale ledger and the inventory

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::sync::Arc;

use shared::{
    InventoryItem, MonthlyProfitSeries, ProfitSummary, SaleRecord, TimeWindow, TopSellingItem,
    WindowBounds,
};

use crate::error::{AppError, AppResult};
use crate::store::{InventoryStore, SaleLedger, Stores};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    inventory: Arc<dyn InventoryStore>,
    sales: Arc<dyn SaleLedger>,
}

impl ReportingService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            inventory: stores.inventory.clone(),
            sales: stores.sales.clone(),
        }
    }

    /// Sales created inside `window`, oldest first
    pub async fn sales_in_window<Tz: TimeZone>(
        &self,
        window: TimeWindow,
        now: DateTime<Tz>,
    ) -> AppResult<Vec<SaleRecord>> {
        let bounds = window.bounds(now);
        self.sales.sales_between(bounds).await
    }

    /// Sales of the last `days` days, newest first
    pub async fn recent_sales<Tz: TimeZone>(&self, days: u32, now: DateTime<Tz>) -> AppResult<Vec<SaleRecord>> {
        if days == 0 {
            return Err(AppError::ValidationError("Invalid number of days.".to_string()));
        }
        let mut sales = self.sales_in_window(TimeWindow::LastDays(days), now).await?;
        sales.reverse();
        Ok(sales)
    }

    /// Sum of profit inside `window`, or over the whole ledger when `None`
    pub async fn total_profit<Tz: TimeZone>(
        &self,
        window: Option<TimeWindow>,
        now: DateTime<Tz>,
    ) -> AppResult<ProfitSummary> {
        let bounds = window.map_or(WindowBounds::UNBOUNDED, |w| w.bounds(now));
        let total_profit = self.sales.profit_between(bounds).await?;
        Ok(ProfitSummary { total_profit })
    }

    /// All-time best sellers by units sold
    pub async fn top_selling_items(&self, limit: usize) -> AppResult<Vec<TopSellingItem>> {
        self.sales.top_selling(limit).await
    }

    /// Profit per calendar month, oldest first
    pub async fn monthly_profit_series(&self) -> AppResult<MonthlyProfitSeries> {
        self.sales.monthly_profit().await
    }

    /// Items at or below their reorder level
    pub async fn low_stock_items(&self) -> AppResult<Vec<InventoryItem>> {
        self.inventory.low_stock_items().await
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}
