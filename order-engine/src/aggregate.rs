//! Order totals, folded from the line items.

use crate::error::EngineError;
use crate::models::{LineItem, OrderTotals};
use crate::money::round_whole;
use rust_decimal::Decimal;

/// Sum the line items into order totals.
///
/// Pure and recomputed from scratch on every call; item lists are small.
/// `rounded_grand_total` and `round_difference` are for display only.
pub fn aggregate(items: &[LineItem]) -> Result<OrderTotals, EngineError> {
    let mut totals = OrderTotals::default();
    for item in items {
        let gross = item.gross_amount().ok_or(EngineError::AmountOverflow)?;
        totals.subtotal = add(totals.subtotal, gross)?;
        totals.discount_amount = add(totals.discount_amount, item.discount_amount)?;
        totals.cgst_amount = add(totals.cgst_amount, item.cgst_amount)?;
        totals.sgst_amount = add(totals.sgst_amount, item.sgst_amount)?;
        totals.igst_amount = add(totals.igst_amount, item.igst_amount)?;
    }

    totals.taxable_amount = totals
        .subtotal
        .checked_sub(totals.discount_amount)
        .ok_or(EngineError::AmountOverflow)?;
    totals.total_tax = add(add(totals.cgst_amount, totals.sgst_amount)?, totals.igst_amount)?;
    totals.grand_total = add(totals.taxable_amount, totals.total_tax)?;
    totals.rounded_grand_total = round_whole(totals.grand_total);
    totals.round_difference = totals
        .rounded_grand_total
        .checked_sub(totals.grand_total)
        .ok_or(EngineError::AmountOverflow)?;
    Ok(totals)
}

fn add(a: Decimal, b: Decimal) -> Result<Decimal, EngineError> {
    a.checked_add(b).ok_or(EngineError::AmountOverflow)
}

/// Sum of the rows' own totals; equals `aggregate(items).grand_total`.
pub fn sum_line_totals(items: &[LineItem]) -> Decimal {
    items.iter().map(|item| item.total_amount).sum()
}
