//! Route definitions for the Clinic Pharmacy Management backend

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Pharmacy inventory
        .nest("/pharmacy", pharmacy_routes())
        // Sales and sales reports
        .nest("/sales", sales_routes())
        // Protected routes - patient records
        .nest("/patients/:clinic", patient_routes(state.clone()))
        // Protected routes - dashboard
        .nest("/dashboard", dashboard_routes(state.clone()))
        // Protected routes - current user
        .nest("/user", user_routes(state))
}

/// Pharmacy inventory routes
fn pharmacy_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items).post(handlers::create_item))
        .route("/all", get(handlers::list_items))
        .route("/low-stock", get(handlers::get_low_stock_items))
        .route(
            "/:item_id",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
}

/// Sales routes
fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/record", post(handlers::record_sale))
        .route("/today", get(handlers::get_today_sales))
        .route("/last-7-days", get(handlers::get_last_7_days_sales))
        .route("/last-30-days", get(handlers::get_last_30_days_sales))
        .route("/profit/today", get(handlers::get_today_profit))
        .route("/profit/7days", get(handlers::get_last_7_days_profit))
        .route("/profit/30days", get(handlers::get_last_30_days_profit))
        .route("/last-days/:days", get(handlers::get_sales_last_days))
        .route("/monthly", get(handlers::get_monthly_sales))
        .route("/range", get(handlers::get_sales_by_date_range))
        .route("/total-profit", get(handlers::get_total_profit))
        .route("/top-selling", get(handlers::get_top_selling_items))
        .route("/low-stock", get(handlers::get_low_stock_items))
        .route("/monthly-profit", get(handlers::get_monthly_profit))
        .route("/:sale_id", delete(handlers::delete_sale))
}

/// Patient routes (protected), one set per clinic
fn patient_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/create", post(handlers::register_patient))
        .route("/all", get(handlers::list_patients))
        .route("/search", get(handlers::search_patient))
        .route(
            "/id/:patient_id",
            get(handlers::get_patient)
                .put(handlers::update_patient)
                .delete(handlers::delete_patient),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Dashboard routes (protected)
fn dashboard_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::get_dashboard_stats))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Current user routes (protected)
fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::get_current_user))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
