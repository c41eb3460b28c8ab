use super::{compose_validated, engine_error, validation_error, SavedOrder, WithNotices};
use crate::export::{sales_orders_csv, CSV_CONTENT_TYPE};
use crate::services::backend_client::{ScopedBackend, SalesOrderWithPayments};
use crate::services::metrics::record_submission;
use crate::services::session::SessionUser;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use order_engine::models::{
    LineItem, Payment, PaymentSummary, SalesOrderHeader, SalesOrderRecord, SalesOrderStatus,
    TaxType,
};
use order_engine::money::round_whole;
use order_engine::payments::{summarize_payments, validate_payment};
use order_engine::workflow::{SalesOrderAction, SalesOrderWorkflow};
use order_engine::{available_actions, transition, Notice, NoticeBuffer, Notifier};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use service_core::middleware::RequestId;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderRow {
    #[serde(flatten)]
    pub order: SalesOrderRecord,
    /// Workflow actions the current user may take.
    pub actions: Vec<SalesOrderAction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderDraft {
    #[serde(flatten)]
    pub header: SalesOrderHeader,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub manual_tax_type: Option<TaxType>,
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: SalesOrderAction,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChanged {
    pub sales_order_id: i64,
    pub status: SalesOrderStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayments {
    pub payments: Vec<Payment>,
    pub summary: PaymentSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithPaymentSummary {
    #[serde(flatten)]
    pub order: SalesOrderWithPayments,
    pub summary: PaymentSummary,
}

async fn find_order(backend: &ScopedBackend<'_>, id: i64) -> Result<SalesOrderRecord, AppError> {
    backend
        .sales_order(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Sales order {} not found", id)))
}

/// Payments are settled against the whole-rupee total shown on the invoice.
fn payable(order: &SalesOrderRecord) -> rust_decimal::Decimal {
    round_whole(order.totals.grand_total)
}

pub async fn list_sales_orders(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
) -> Result<Json<Vec<SalesOrderRow>>, AppError> {
    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    let orders = backend.list_sales_orders().await?;

    let rows = orders
        .into_iter()
        .map(|order| {
            let actions = order
                .header
                .status
                .map(|status| available_actions::<SalesOrderWorkflow>(status, user.role()))
                .unwrap_or_default();
            SalesOrderRow { order, actions }
        })
        .collect();
    Ok(Json(rows))
}

pub async fn save_sales_order(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
    Json(draft): Json<SalesOrderDraft>,
) -> Result<Json<WithNotices<SavedOrder>>, AppError> {
    let mut header = draft.header;
    // New orders are confirmed on save; existing ones must still be editable.
    let status = *header.status.get_or_insert(SalesOrderStatus::Confirmed);
    transition::<SalesOrderWorkflow>(status, SalesOrderAction::Edit, user.role())
        .map_err(engine_error)?;

    let notices = NoticeBuffer::new();
    let mut composer =
        compose_validated(header, draft.items, draft.manual_tax_type, &notices)?;
    let submission = composer.submission().map_err(engine_error)?;

    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    let result = match backend.save_sales_order(&submission).await {
        Ok(result) => result,
        Err(e) => {
            record_submission("sales", "rejected");
            return Err(e.into());
        }
    };

    composer.mark_submitted().map_err(engine_error)?;
    record_submission("sales", "submitted");
    tracing::info!(
        customer = %composer.header().customer_name,
        items = composer.items().len(),
        grand_total = %submission.totals.grand_total,
        "Sales order saved"
    );
    notices.notify(Notice::success("Sales order saved"));

    Ok(Json(WithNotices {
        data: SavedOrder {
            result,
            totals: composer.totals().map_err(engine_error)?,
        },
        notices: notices.drain(),
    }))
}

pub async fn sales_order_items(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
    Path(id): Path<i64>,
) -> Result<Json<Vec<LineItem>>, AppError> {
    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    Ok(Json(backend.sales_order_items(id).await?))
}

async fn apply_action(
    backend: &ScopedBackend<'_>,
    user: &SessionUser,
    id: i64,
    action: SalesOrderAction,
) -> Result<StatusChanged, AppError> {
    let order = find_order(backend, id).await?;
    let current = order.header.status.unwrap_or(SalesOrderStatus::Confirmed);
    let next = transition::<SalesOrderWorkflow>(current, action, user.role())
        .map_err(engine_error)?;

    match action {
        SalesOrderAction::Cancel => backend.cancel_sales_order(id).await?,
        SalesOrderAction::Edit if next == current => {}
        SalesOrderAction::Edit => backend.update_sales_order_status(id, next).await?,
    }

    tracing::info!(sales_order_id = id, from = %current, to = %next, action = %action, "Sales order status changed");
    Ok(StatusChanged {
        sales_order_id: id,
        status: next,
    })
}

pub async fn change_sales_order_status(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
    Path(id): Path<i64>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<StatusChanged>, AppError> {
    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    Ok(Json(apply_action(&backend, &user, id, req.action).await?))
}

pub async fn cancel_sales_order(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
    Path(id): Path<i64>,
) -> Result<Json<StatusChanged>, AppError> {
    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    Ok(Json(
        apply_action(&backend, &user, id, SalesOrderAction::Cancel).await?,
    ))
}

pub async fn sales_orders_with_payments(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
) -> Result<Json<Vec<OrderWithPaymentSummary>>, AppError> {
    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    let orders = backend.sales_orders_with_payments().await?;

    Ok(Json(
        orders
            .into_iter()
            .map(|order| {
                let summary = summarize_payments(payable(&order.order), &order.payments);
                OrderWithPaymentSummary { order, summary }
            })
            .collect(),
    ))
}

pub async fn export_sales_orders(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
) -> Result<impl IntoResponse, AppError> {
    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    let orders = backend.list_sales_orders().await?;
    Ok((
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sales-orders.csv\"",
            ),
        ],
        sales_orders_csv(&orders),
    ))
}

pub async fn list_payments(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
    Path(id): Path<i64>,
) -> Result<Json<OrderPayments>, AppError> {
    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    let order = find_order(&backend, id).await?;
    let payments = backend.payments_for_order(id).await?;
    let summary = summarize_payments(payable(&order), &payments);
    Ok(Json(OrderPayments { payments, summary }))
}

pub async fn record_payment(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
    Path(id): Path<i64>,
    Json(mut payment): Json<Payment>,
) -> Result<Json<WithNotices<OrderPayments>>, AppError> {
    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    let order = find_order(&backend, id).await?;
    if order.header.status == Some(SalesOrderStatus::Cancelled) {
        return Err(AppError::RuleViolation(
            "Payments cannot be recorded against a cancelled order".to_string(),
        ));
    }
    payment.sales_order_id = id;

    // An edited payment no longer counts towards what is already paid.
    let others: Vec<Payment> = backend
        .payments_for_order(id)
        .await?
        .into_iter()
        .filter(|p| payment.payment_id.is_none() || p.payment_id != payment.payment_id)
        .collect();
    let before = summarize_payments(payable(&order), &others);
    validate_payment(&payment, before.balance).map_err(validation_error)?;

    backend.save_payment(&payment).await?;
    tracing::info!(sales_order_id = id, amount = %payment.amount, mode = payment.payment_mode.as_str(), "Payment recorded");

    let payments = backend.payments_for_order(id).await?;
    let summary = summarize_payments(payable(&order), &payments);
    let notices = NoticeBuffer::new();
    notices.notify(Notice::success("Payment recorded"));

    Ok(Json(WithNotices {
        data: OrderPayments { payments, summary },
        notices: notices.drain(),
    }))
}

pub async fn delete_payment(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
    Path(payment_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    backend.delete_payment(payment_id).await?;
    tracing::info!(payment_id, "Payment deleted");
    Ok(StatusCode::NO_CONTENT)
}
