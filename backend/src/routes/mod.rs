//! Route definitions for the hotel inventory engine

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes. Everything here sits behind the JWT middleware.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Inventory items
        .nest("/items", item_routes())
        // Transaction ledger
        .nest("/transactions", transaction_routes())
        // Audits and discrepancies
        .nest("/audits", audit_routes())
        .nest("/discrepancies", discrepancy_routes())
        // Adjustment requests
        .nest("/adjustments", adjustment_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Inventory item routes
fn item_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_items).post(handlers::register_item),
        )
        .route("/low-stock", get(handlers::low_stock_items))
        .route("/:item_id", get(handlers::get_item))
}

/// Transaction ledger routes
fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_transactions).post(handlers::record_transaction),
        )
        .route("/pending", get(handlers::pending_transactions))
        .route("/export", get(handlers::export_transactions))
        .route("/:transaction_id", get(handlers::get_transaction))
        .route("/:transaction_id/approve", post(handlers::approve_transaction))
        .route("/:transaction_id/reject", post(handlers::reject_transaction))
}

/// Audit routes
fn audit_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_audits).post(handlers::create_audit))
        .route("/:audit_id", get(handlers::get_audit))
        .route("/:audit_id/counts", post(handlers::record_count))
        .route("/:audit_id/complete", post(handlers::complete_audit))
        .route("/:audit_id/approve", post(handlers::approve_audit))
        .route("/:audit_id/review", post(handlers::flag_for_review))
}

/// Discrepancy routes
fn discrepancy_routes() -> Router<AppState> {
    Router::new()
        .route("/:discrepancy_id/resolve", post(handlers::resolve_discrepancy))
        .route("/:discrepancy_id/adjustment", post(handlers::raise_from_discrepancy))
}

/// Adjustment request routes
fn adjustment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_requests).post(handlers::create_request))
        .route("/:request_id", get(handlers::get_request))
        .route("/:request_id/approve", post(handlers::approve_request))
        .route("/:request_id/reject", post(handlers::reject_request))
}
