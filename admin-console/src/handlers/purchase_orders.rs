use super::{compose_validated, engine_error, SavedOrder, WithNotices};
use crate::export::{purchase_orders_csv, CSV_CONTENT_TYPE};
use crate::services::backend_client::ScopedBackend;
use crate::services::metrics::record_submission;
use crate::services::session::SessionUser;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use order_engine::models::{
    LineItem, PurchaseOrderHeader, PurchaseOrderRecord, PurchaseOrderStatus, TaxType,
};
use order_engine::workflow::{PurchaseOrderAction, PurchaseOrderWorkflow};
use order_engine::{available_actions, transition, Notice, NoticeBuffer, Notifier};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use service_core::middleware::RequestId;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderRow {
    #[serde(flatten)]
    pub order: PurchaseOrderRecord,
    pub actions: Vec<PurchaseOrderAction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderDraft {
    #[serde(flatten)]
    pub header: PurchaseOrderHeader,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub manual_tax_type: Option<TaxType>,
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: PurchaseOrderAction,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChanged {
    pub purchase_order_id: i64,
    pub status: PurchaseOrderStatus,
    /// What may follow, for the same user.
    pub actions: Vec<PurchaseOrderAction>,
}

pub async fn list_purchase_orders(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
) -> Result<Json<Vec<PurchaseOrderRow>>, AppError> {
    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    let orders = backend.list_purchase_orders().await?;

    Ok(Json(
        orders
            .into_iter()
            .map(|order| {
                let status = order.header.status.unwrap_or(PurchaseOrderStatus::Draft);
                PurchaseOrderRow {
                    actions: available_actions::<PurchaseOrderWorkflow>(status, user.role()),
                    order,
                }
            })
            .collect(),
    ))
}

/// Create or update a purchase order. Only drafts can be edited.
pub async fn save_purchase_order(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
    Json(draft): Json<PurchaseOrderDraft>,
) -> Result<Json<WithNotices<SavedOrder>>, AppError> {
    let mut header = draft.header;
    let status = *header.status.get_or_insert(PurchaseOrderStatus::Draft);
    transition::<PurchaseOrderWorkflow>(status, PurchaseOrderAction::Edit, user.role())
        .map_err(engine_error)?;

    let notices = NoticeBuffer::new();
    let mut composer =
        compose_validated(header, draft.items, draft.manual_tax_type, &notices)?;
    let submission = composer.submission().map_err(engine_error)?;

    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    let result = match backend.save_purchase_order(&submission).await {
        Ok(result) => result,
        Err(e) => {
            record_submission("purchase", "rejected");
            return Err(e.into());
        }
    };

    composer.mark_submitted().map_err(engine_error)?;
    record_submission("purchase", "submitted");
    tracing::info!(
        vendor = %composer.header().vendor_name,
        items = composer.items().len(),
        grand_total = %submission.totals.grand_total,
        "Purchase order saved"
    );
    notices.notify(Notice::success("Purchase order saved"));

    Ok(Json(WithNotices {
        data: SavedOrder {
            result,
            totals: composer.totals().map_err(engine_error)?,
        },
        notices: notices.drain(),
    }))
}

pub async fn purchase_order_items(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
    Path(id): Path<i64>,
) -> Result<Json<Vec<LineItem>>, AppError> {
    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    Ok(Json(backend.purchase_order_items(id).await?))
}

async fn find_order(
    backend: &ScopedBackend<'_>,
    id: i64,
) -> Result<PurchaseOrderRecord, AppError> {
    backend
        .purchase_order(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Purchase order {} not found", id)))
}

pub async fn change_purchase_order_status(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
    Path(id): Path<i64>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<StatusChanged>, AppError> {
    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    let order = find_order(&backend, id).await?;
    let current = order.header.status.unwrap_or(PurchaseOrderStatus::Draft);
    let next = transition::<PurchaseOrderWorkflow>(current, req.action, user.role())
        .map_err(engine_error)?;

    if next != current {
        backend.update_purchase_order_status(id, next).await?;
    }
    tracing::info!(purchase_order_id = id, from = %current, to = %next, action = %req.action, "Purchase order status changed");

    Ok(Json(StatusChanged {
        purchase_order_id: id,
        status: next,
        actions: available_actions::<PurchaseOrderWorkflow>(next, user.role()),
    }))
}

pub async fn export_purchase_orders(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
) -> Result<impl IntoResponse, AppError> {
    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    let orders = backend.list_purchase_orders().await?;
    Ok((
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"purchase-orders.csv\"",
            ),
        ],
        purchase_orders_csv(&orders),
    ))
}
