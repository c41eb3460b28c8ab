//! Live line-item editing: the browser sends each field change here and
//! renders the recomputed row.

use super::{engine_error, WithNotices};
use crate::services::session::SessionUser;
use crate::AppState;
use axum::{extract::State, Json};
use order_engine::models::{LineItem, OrderKind, OrderTotals, Product, SerialStatus, TaxType};
use order_engine::serials::{fetch_candidate_serials, needs_serial_fetch, select_serials};
use order_engine::{aggregate, recompute, rederive, FieldChange, NoticeBuffer, SerialTracked};
use serde::Deserialize;
use service_core::error::AppError;
use service_core::middleware::RequestId;
use std::collections::HashSet;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecomputeRequest {
    pub order_kind: OrderKind,
    #[serde(default)]
    pub item: LineItem,
    pub change: FieldChange,
    #[serde(default)]
    pub tax_type: TaxType,
    /// Sales location the stock and serials come from.
    #[serde(default)]
    pub location_id: Option<i64>,
}

pub async fn recompute_line_item(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
    Json(req): Json<RecomputeRequest>,
) -> Result<Json<WithNotices<LineItem>>, AppError> {
    let backend = state
        .backend
        .scoped(&user.backend, Some(request_id.as_str()));
    let notices = NoticeBuffer::new();

    let catalog: Vec<Product> = match (req.change, req.order_kind) {
        (FieldChange::ProductId(_), OrderKind::Sales) => {
            backend.saleable_items(req.location_id).await?
        }
        (FieldChange::ProductId(_), OrderKind::Purchase) => backend.list_products().await?,
        _ => Vec::new(),
    };

    let mut item =
        recompute(&req.item, req.change, req.tax_type, catalog.as_slice()).map_err(engine_error)?;

    // Purchase orders bring in new stock, so their serials are typed in
    // rather than picked from what is on hand.
    let quantity_or_product =
        matches!(req.change, FieldChange::ProductId(_) | FieldChange::Quantity(_));
    if quantity_or_product
        && req.order_kind == OrderKind::Sales
        && needs_serial_fetch(item.serial_no_applicable, item.quantity, req.location_id)
    {
        if let (Some(product_id), Some(location_id)) = (item.product_id, req.location_id) {
            item.serial_options = fetch_candidate_serials(
                &backend,
                &notices,
                product_id,
                location_id,
                SerialStatus::InStock,
            )
            .await;

            let available: HashSet<&str> = item
                .serial_options
                .iter()
                .map(|o| o.serial_no.as_str())
                .collect();
            item.serial_numbers
                .retain(|serial| available.contains(serial.as_str()));
            if let Some(required) = item.required_serial_count() {
                item.serial_numbers.truncate(required);
            }
        }
    }

    Ok(Json(WithNotices {
        data: item,
        notices: notices.drain(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SelectSerialsRequest {
    pub item: LineItem,
    pub selected: Vec<String>,
}

pub async fn select_line_item_serials(
    _user: SessionUser,
    Json(req): Json<SelectSerialsRequest>,
) -> Result<Json<LineItem>, AppError> {
    let mut item = req.item;
    select_serials(&mut item, req.selected).map_err(engine_error)?;
    Ok(Json(item))
}

#[derive(Debug, Deserialize)]
pub struct TotalsRequest {
    pub items: Vec<LineItem>,
}

/// Footer totals for the rows on screen. Row amounts are re-derived first.
pub async fn order_totals(
    _user: SessionUser,
    Json(req): Json<TotalsRequest>,
) -> Result<Json<OrderTotals>, AppError> {
    let items = req
        .items
        .iter()
        .map(rederive)
        .collect::<Result<Vec<_>, _>>()
        .map_err(engine_error)?;
    let totals = aggregate(&items).map_err(engine_error)?;
    Ok(Json(totals))
}
