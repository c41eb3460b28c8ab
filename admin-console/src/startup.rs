use axum::{
    middleware::from_fn,
    routing::{delete, get, post},
    Router,
};
use service_core::middleware::{request_id_middleware, security_headers_middleware};
use service_core::observability::REQUEST_ID_HEADER;
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::SessionSettings;
use crate::handlers::{
    app::{health_check, index},
    auth::{login_handler, login_page, logout_handler},
    documents::{purchase_order_document, sales_invoice},
    inventory::save_adjustment,
    line_items::{order_totals, recompute_line_item, select_line_item_serials},
    purchase_orders::{
        change_purchase_order_status, export_purchase_orders, list_purchase_orders,
        purchase_order_items, save_purchase_order,
    },
    sales_orders::{
        cancel_sales_order, change_sales_order_status, delete_payment, export_sales_orders,
        list_payments, list_sales_orders, record_payment, sales_order_items,
        sales_orders_with_payments, save_sales_order,
    },
};
use crate::services::metrics::metrics_middleware;
use crate::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/line-items/recompute", post(recompute_line_item))
        .route("/line-items/serials", post(select_line_item_serials))
        .route("/orders/totals", post(order_totals))
        .route(
            "/sales-orders",
            get(list_sales_orders).post(save_sales_order),
        )
        .route("/sales-orders/with-payments", get(sales_orders_with_payments))
        .route("/sales-orders/export", get(export_sales_orders))
        .route("/sales-orders/:id/items", get(sales_order_items))
        .route("/sales-orders/:id/status", post(change_sales_order_status))
        .route("/sales-orders/:id/cancel", post(cancel_sales_order))
        .route(
            "/sales-orders/:id/payments",
            get(list_payments).post(record_payment),
        )
        .route("/payments/:id", delete(delete_payment))
        .route(
            "/purchase-orders",
            get(list_purchase_orders).post(save_purchase_order),
        )
        .route("/purchase-orders/export", get(export_purchase_orders))
        .route("/purchase-orders/:id/items", get(purchase_order_items))
        .route(
            "/purchase-orders/:id/status",
            post(change_purchase_order_status),
        )
        .route("/inventory/adjustments", post(save_adjustment))
}

pub fn build_router(state: AppState, session: &SessionSettings) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(session.secure_cookie)
        .with_expiry(Expiry::OnInactivity(Duration::hours(session.inactivity_hours)));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(crate::handlers::metrics::metrics))
        .route("/login", get(login_page).post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/sales-orders/:id/invoice", get(sales_invoice))
        .route("/purchase-orders/:id/document", get(purchase_order_document))
        .nest("/api", api_routes())
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
