//! HTTP handlers for sales recording and sales reports

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use shared::{
    MonthlyProfitSeries, ProfitSummary, RecordSaleInput, SaleRecord, TimeWindow, TopSellingItem,
};

use crate::error::{AppError, AppResult};
use crate::services::{ReportingService, SaleService};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordSaleRequest {
    pub pharmacy_item: Uuid,
    #[validate(range(min = 1, message = "Quantity sold must be at least 1"))]
    pub quantity_sold: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Debug, Deserialize, Validate)]
pub struct TopSellingQuery {
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<usize>,
}

/// Record a sale
pub async fn record_sale(
    State(state): State<AppState>,
    Json(input): Json<RecordSaleRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let service = SaleService::new(&state.stores);
    let sale = service
        .record_sale(RecordSaleInput {
            pharmacy_item: input.pharmacy_item,
            quantity_sold: input.quantity_sold,
        })
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Sale recorded",
        "sale": sale
    })))
}

/// Delete a sale and restore its stock
pub async fn delete_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = SaleService::new(&state.stores);
    service.delete_sale(sale_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Sale deleted successfully"
    })))
}

async fn sales_in(state: &AppState, window: TimeWindow) -> AppResult<Json<Vec<SaleRecord>>> {
    let service = ReportingService::new(&state.stores);
    Ok(Json(service.sales_in_window(window, Local::now()).await?))
}

/// Sales since local midnight
pub async fn get_today_sales(State(state): State<AppState>) -> AppResult<Json<Vec<SaleRecord>>> {
    sales_in(&state, TimeWindow::Today).await
}

/// Sales of the last 7 days
pub async fn get_last_7_days_sales(State(state): State<AppState>) -> AppResult<Json<Vec<SaleRecord>>> {
    sales_in(&state, TimeWindow::LastDays(7)).await
}

/// Sales of the last 30 days
pub async fn get_last_30_days_sales(State(state): State<AppState>) -> AppResult<Json<Vec<SaleRecord>>> {
    sales_in(&state, TimeWindow::LastDays(30)).await
}

/// Sales of the current calendar month
pub async fn get_monthly_sales(State(state): State<AppState>) -> AppResult<Json<Vec<SaleRecord>>> {
    sales_in(&state, TimeWindow::ThisMonth).await
}

/// Sales of the last `days` days, newest first
pub async fn get_sales_last_days(
    State(state): State<AppState>,
    Path(days): Path<String>,
) -> AppResult<Json<Vec<SaleRecord>>> {
    let days = days
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|d| *d > 0)
        .ok_or_else(|| AppError::ValidationError("Invalid number of days.".to_string()))?;

    let service = ReportingService::new(&state.stores);
    Ok(Json(service.recent_sales(days, Local::now()).await?))
}

fn parse_date(field: &str, value: Option<&str>) -> AppResult<NaiveDate> {
    let value = value.map(str::trim).filter(|v| !v.is_empty()).ok_or_else(|| AppError::Validation {
        field: field.to_string(),
        message: "Date is required".to_string(),
    })?;
    // Accept full timestamps too and keep only the calendar date
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| AppError::Validation {
        field: field.to_string(),
        message: "Date must be formatted as YYYY-MM-DD".to_string(),
    })
}

/// Sales between two calendar dates, both inclusive
pub async fn get_sales_by_date_range(
    State(state): State<AppState>,
    Query(query): Query<SalesRangeQuery>,
) -> AppResult<impl IntoResponse> {
    let start = parse_date("startDate", query.start_date.as_deref())?;
    let end = parse_date("endDate", query.end_date.as_deref())?;
    let window = TimeWindow::range(start, end).map_err(|message| AppError::Validation {
        field: "endDate".to_string(),
        message: message.to_string(),
    })?;

    let service = ReportingService::new(&state.stores);
    let sales = service.sales_in_window(window, Local::now()).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&sales)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"sales.csv\""),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(sales).into_response())
    }
}

async fn profit_in(state: &AppState, window: Option<TimeWindow>) -> AppResult<Json<ProfitSummary>> {
    let service = ReportingService::new(&state.stores);
    Ok(Json(service.total_profit(window, Local::now()).await?))
}

/// Profit of all recorded sales
pub async fn get_total_profit(State(state): State<AppState>) -> AppResult<Json<ProfitSummary>> {
    profit_in(&state, None).await
}

/// Profit since local midnight
pub async fn get_today_profit(State(state): State<AppState>) -> AppResult<Json<ProfitSummary>> {
    profit_in(&state, Some(TimeWindow::Today)).await
}

/// Profit of the last 7 calendar days including today
pub async fn get_last_7_days_profit(State(state): State<AppState>) -> AppResult<Json<ProfitSummary>> {
    profit_in(&state, Some(TimeWindow::TrailingDays(7))).await
}

/// Profit of the last 30 calendar days including today
pub async fn get_last_30_days_profit(State(state): State<AppState>) -> AppResult<Json<ProfitSummary>> {
    profit_in(&state, Some(TimeWindow::TrailingDays(30))).await
}

/// Best-selling items by units sold
pub async fn get_top_selling_items(
    State(state): State<AppState>,
    Query(query): Query<TopSellingQuery>,
) -> AppResult<Json<Vec<TopSellingItem>>> {
    query.validate()?;
    let limit = query.limit.unwrap_or(state.config.reports.top_selling_limit);

    let service = ReportingService::new(&state.stores);
    Ok(Json(service.top_selling_items(limit).await?))
}

/// Profit per calendar month
pub async fn get_monthly_profit(State(state): State<AppState>) -> AppResult<Json<MonthlyProfitSeries>> {
    let service = ReportingService::new(&state.stores);
    Ok(Json(service.monthly_profit_series().await?))
}
