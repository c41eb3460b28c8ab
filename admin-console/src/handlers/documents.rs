use super::engine_error;
use crate::documents::{purchase_order_view, sales_invoice_view, DocumentView};
use crate::services::session::SessionUser;
use crate::AppState;
use askama::Template;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use service_core::error::AppError;
use service_core::middleware::RequestId;

#[derive(Template)]
#[template(path = "sales_invoice.html")]
pub struct SalesInvoiceTemplate {
    pub doc: DocumentView,
}

#[derive(Template)]
#[template(path = "purchase_order.html")]
pub struct PurchaseOrderTemplate {
    pub doc: DocumentView,
}

pub async fn sales_invoice(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    let order = backend
        .sales_order(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Sales order {} not found", id)))?;
    let items = backend.sales_order_items(id).await?;

    Ok(SalesInvoiceTemplate {
        doc: sales_invoice_view(&order, &items).map_err(engine_error)?,
    })
}

pub async fn purchase_order_document(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    let order = backend
        .purchase_order(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Purchase order {} not found", id)))?;
    let items = backend.purchase_order_items(id).await?;

    Ok(PurchaseOrderTemplate {
        doc: purchase_order_view(&order, &items).map_err(engine_error)?,
    })
}
