//! Submission rules for sales and purchase orders.
//!
//! Rules run in a fixed order and the first failure is reported; nothing is
//! sent to the backend unless every rule passes.

use crate::error::{ValidationError, ValidationRule};
use crate::models::{LineItem, OrderKind, TaxType};
use crate::serials::ensure_serial_cardinality;
use rust_decimal::Decimal;

/// Check an order's items before submission.
pub fn validate_submission(
    kind: OrderKind,
    tax_type: TaxType,
    items: &[LineItem],
) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::new(
            ValidationRule::NoItems,
            "Add at least one item before submitting",
        ));
    }

    for (index, item) in items.iter().enumerate() {
        let row = index + 1;
        check_product(item, row)?;
        check_quantity(item, row)?;
        ensure_serial_cardinality(item, row)?;
        check_vehicle(item, row)?;
        if kind == OrderKind::Sales {
            check_stock(item, row)?;
        }
        check_tax_consistency(item, row, tax_type)?;
    }

    Ok(())
}

/// Checks applied when a row is added to or updated in the item list.
pub fn validate_row_commit(item: &LineItem, row: usize) -> Result<(), ValidationError> {
    check_product(item, row)?;
    ensure_serial_cardinality(item, row)
}

fn check_product(item: &LineItem, row: usize) -> Result<(), ValidationError> {
    if item.has_product() {
        Ok(())
    } else {
        Err(ValidationError::for_row(
            ValidationRule::NoProduct,
            row,
            format!("Row {}: select a product", row),
        ))
    }
}

fn check_quantity(item: &LineItem, row: usize) -> Result<(), ValidationError> {
    if item.quantity > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::for_row(
            ValidationRule::NonPositiveQuantity,
            row,
            format!(
                "Row {} ({}): quantity must be greater than zero",
                row, item.product_name
            ),
        ))
    }
}

fn check_vehicle(item: &LineItem, row: usize) -> Result<(), ValidationError> {
    if !item.is_final_vehicle {
        return Ok(());
    }
    let missing = item.vehicle.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::for_row(
            ValidationRule::VehicleDetails,
            row,
            format!(
                "Row {} ({}): enter {}",
                row,
                item.product_name,
                missing.join(", ")
            ),
        ))
    }
}

/// Uses the stock snapshot taken when the product was picked; the backend
/// still has the final say.
fn check_stock(item: &LineItem, row: usize) -> Result<(), ValidationError> {
    match item.available_quantity {
        Some(available) if item.quantity > available => Err(ValidationError::for_row(
            ValidationRule::InsufficientStock,
            row,
            format!(
                "Row {} ({}): only {} available, {} requested",
                row,
                item.product_name,
                available.normalize(),
                item.quantity.normalize()
            ),
        )),
        _ => Ok(()),
    }
}

fn check_tax_consistency(
    item: &LineItem,
    row: usize,
    tax_type: TaxType,
) -> Result<(), ValidationError> {
    let consistent = match tax_type {
        TaxType::Intra => item.igst_percent.is_zero() && item.igst_amount.is_zero(),
        TaxType::Inter => {
            item.cgst_percent.is_zero()
                && item.sgst_percent.is_zero()
                && item.cgst_amount.is_zero()
                && item.sgst_amount.is_zero()
        }
    };
    if consistent {
        Ok(())
    } else {
        let expected = match tax_type {
            TaxType::Intra => "CGST/SGST only",
            TaxType::Inter => "IGST only",
        };
        Err(ValidationError::for_row(
            ValidationRule::TaxMismatch,
            row,
            format!(
                "Row {} ({}): {} orders must carry {}",
                row, item.product_name, tax_type, expected
            ),
        ))
    }
}
