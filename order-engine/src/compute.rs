//! Line item computation.
//!
//! Every edit to a row goes through [`recompute`], which applies the change
//! and re-derives discount, tax and total amounts with [`derive_amounts`].
//! The same derivation backs sales orders, purchase orders and the
//! inventory screens.

use crate::error::EngineError;
use crate::models::{GstSplit, LineItem, ProductCatalog, TaxType};
use crate::money::percent_of;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single user edit to a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FieldChange {
    ProductId(i64),
    Quantity(Decimal),
    UnitPrice(Decimal),
    DiscountPercent(Decimal),
    CgstPercent(Decimal),
    SgstPercent(Decimal),
    IgstPercent(Decimal),
}

/// Amounts derived from a row's quantity, price and percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedAmounts {
    pub discount_amount: Decimal,
    pub base_amount: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub igst_amount: Decimal,
    pub total_amount: Decimal,
}

/// Derive amounts from the row's inputs. Signed quantities stay signed.
///
/// Fails with [`EngineError::AmountOverflow`] rather than panicking when an
/// intermediate amount leaves the `Decimal` range.
pub fn derive_amounts(item: &LineItem) -> Result<DerivedAmounts, EngineError> {
    let overflow = || EngineError::AmountOverflow;
    let gross = item.gross_amount().ok_or_else(overflow)?;
    let discount_amount = percent_of(gross, item.discount_percent).ok_or_else(overflow)?;
    let base_amount = gross.checked_sub(discount_amount).ok_or_else(overflow)?;
    let cgst_amount = percent_of(base_amount, item.cgst_percent).ok_or_else(overflow)?;
    let sgst_amount = percent_of(base_amount, item.sgst_percent).ok_or_else(overflow)?;
    let igst_amount = percent_of(base_amount, item.igst_percent).ok_or_else(overflow)?;
    let total_amount = [cgst_amount, sgst_amount, igst_amount]
        .into_iter()
        .try_fold(base_amount, Decimal::checked_add)
        .ok_or_else(overflow)?;

    Ok(DerivedAmounts {
        discount_amount,
        base_amount,
        cgst_amount,
        sgst_amount,
        igst_amount,
        total_amount,
    })
}

/// Overwrite the row's stored amounts with ones derived from its inputs.
///
/// Rows arriving from the browser carry amounts that are never trusted;
/// every row entering an order goes through here first.
pub fn rederive(item: &LineItem) -> Result<LineItem, EngineError> {
    let derived = derive_amounts(item)?;
    Ok(LineItem {
        discount_amount: derived.discount_amount,
        cgst_amount: derived.cgst_amount,
        sgst_amount: derived.sgst_amount,
        igst_amount: derived.igst_amount,
        total_amount: derived.total_amount,
        ..item.clone()
    })
}

fn set_split(item: &mut LineItem, split: GstSplit) {
    item.cgst_percent = split.cgst_percent;
    item.sgst_percent = split.sgst_percent;
    item.igst_percent = split.igst_percent;
}

/// Apply one edit and return the updated row.
///
/// Picking a product copies its price, unit, HSN code and serial/vehicle
/// flags, resets the quantity (to 1 for a finished vehicle, else 0), splits
/// its GST rate by `tax_type` and drops any serials chosen for the previous
/// product.
pub fn recompute<C>(
    item: &LineItem,
    change: FieldChange,
    tax_type: TaxType,
    catalog: &C,
) -> Result<LineItem, EngineError>
where
    C: ProductCatalog + ?Sized,
{
    let next = match change {
        FieldChange::ProductId(product_id) => {
            let product = catalog
                .find_product(product_id)
                .ok_or(EngineError::ProductNotFound(product_id))?;

            debug!(product_id, tax_type = %tax_type, "Product selected for line item");

            let mut next = LineItem {
                product_id: Some(product.product_id),
                product_name: product.product_name.clone(),
                uom: product.uom.clone(),
                hsn_code: product.hsn_code.clone(),
                unit_price: product.unit_price,
                gst_percentage: product.gst_percentage,
                available_quantity: product.available_quantity,
                serial_no_applicable: product.serial_no_applicable,
                is_final_vehicle: product.is_final_vehicle,
                quantity: if product.is_final_vehicle {
                    Decimal::ONE
                } else {
                    Decimal::ZERO
                },
                discount_percent: item.discount_percent,
                ..Default::default()
            };
            set_split(
                &mut next,
                GstSplit::for_rate(product.gst_percentage, tax_type),
            );
            next
        }
        FieldChange::Quantity(quantity) => LineItem {
            quantity: if item.is_final_vehicle {
                Decimal::ONE
            } else {
                quantity
            },
            ..item.clone()
        },
        FieldChange::UnitPrice(unit_price) => LineItem {
            unit_price,
            ..item.clone()
        },
        FieldChange::DiscountPercent(discount_percent) => LineItem {
            discount_percent,
            ..item.clone()
        },
        FieldChange::CgstPercent(cgst_percent) => LineItem {
            cgst_percent,
            ..item.clone()
        },
        FieldChange::SgstPercent(sgst_percent) => LineItem {
            sgst_percent,
            ..item.clone()
        },
        FieldChange::IgstPercent(igst_percent) => LineItem {
            igst_percent,
            ..item.clone()
        },
    };

    rederive(&next)
}

/// Re-split the row's GST rate for a new tax type and re-derive amounts.
pub fn apply_tax_type(item: &LineItem, tax_type: TaxType) -> Result<LineItem, EngineError> {
    let mut next = item.clone();
    set_split(&mut next, GstSplit::for_rate(item.gst_percentage, tax_type));
    rederive(&next)
}
