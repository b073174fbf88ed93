//! Dashboard handlers

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use shared::{DashboardStats, DashboardWindow};

use crate::error::{AppError, AppResult};
use crate::services::DashboardService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    pub region: Option<String>,
    pub district: Option<String>,
    pub time_filter: Option<String>, // "week", "month", "year" or "all"
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub success: bool,
    #[serde(flatten)]
    pub stats: DashboardStats,
}

/// Patient statistics merged across every clinic
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<DashboardResponse>> {
    let window = match query.time_filter.as_deref().filter(|f| !f.is_empty()) {
        Some(filter) => Some(
            filter
                .parse::<DashboardWindow>()
                .map_err(|message| AppError::Validation {
                    field: "timeFilter".to_string(),
                    message,
                })?,
        ),
        None => None,
    };

    let service = DashboardService::new(&state.stores, &state.config.dashboard);
    let stats = service
        .get_dashboard_stats(
            query.region.as_deref(),
            query.district.as_deref(),
            window,
            Local::now(),
        )
        .await?;

    Ok(Json(DashboardResponse {
        success: true,
        stats,
    }))
}
