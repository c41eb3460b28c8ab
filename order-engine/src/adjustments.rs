//! Rules for inventory adjustment, move and issue drafts.

use crate::error::{ValidationError, ValidationRule};
use crate::models::{AdjustmentDraft, AdjustmentKind, AdjustmentRow};
use crate::serials::ensure_serial_cardinality;
use rust_decimal::Decimal;

/// Check a draft before it is saved. The first failing rule is reported.
pub fn validate_adjustment(draft: &AdjustmentDraft) -> Result<(), ValidationError> {
    if draft.rows.is_empty() {
        return Err(ValidationError::new(
            ValidationRule::NoItems,
            "Add at least one item before submitting",
        ));
    }

    let Some(location_id) = draft.location_id else {
        return Err(ValidationError::new(
            ValidationRule::MissingLocation,
            "Select a location",
        ));
    };

    if draft.kind == AdjustmentKind::Move {
        match draft.to_location_id {
            None => {
                return Err(ValidationError::new(
                    ValidationRule::MissingLocation,
                    "Select a destination location",
                ))
            }
            Some(to) if to == location_id => {
                return Err(ValidationError::new(
                    ValidationRule::SameLocation,
                    "Source and destination locations must differ",
                ))
            }
            Some(_) => {}
        }
    }

    for (index, row) in draft.rows.iter().enumerate() {
        check_row(draft.kind, row, index + 1)?;
    }
    Ok(())
}

fn check_row(
    kind: AdjustmentKind,
    row: &AdjustmentRow,
    number: usize,
) -> Result<(), ValidationError> {
    if row.product_id.is_none() {
        return Err(ValidationError::for_row(
            ValidationRule::NoProduct,
            number,
            format!("Row {}: select a product", number),
        ));
    }

    if row.quantity_change.is_zero() {
        return Err(ValidationError::for_row(
            ValidationRule::ZeroQuantity,
            number,
            format!("Row {} ({}): quantity cannot be zero", number, row.product_name),
        ));
    }

    // Moves and issues always take stock out of the source location.
    if kind != AdjustmentKind::Adjustment && row.quantity_change < Decimal::ZERO {
        return Err(ValidationError::for_row(
            ValidationRule::NonPositiveQuantity,
            number,
            format!(
                "Row {} ({}): {} quantity must be greater than zero",
                number, row.product_name, kind
            ),
        ));
    }

    let deducted = match kind {
        AdjustmentKind::Adjustment if row.quantity_change < Decimal::ZERO => {
            -row.quantity_change
        }
        AdjustmentKind::Adjustment => Decimal::ZERO,
        AdjustmentKind::Move | AdjustmentKind::Issue => row.quantity_change,
    };
    if let Some(available) = row.available_quantity {
        if deducted > available {
            return Err(ValidationError::for_row(
                ValidationRule::InsufficientStock,
                number,
                format!(
                    "Row {} ({}): only {} available, {} requested",
                    number,
                    row.product_name,
                    available.normalize(),
                    deducted.normalize()
                ),
            ));
        }
    }

    ensure_serial_cardinality(row, number)
}
