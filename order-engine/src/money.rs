//! Decimal helpers for amounts. Arithmetic stays exact; rounding happens only
//! where a value is displayed or a whole-unit grand total is shown.

use rust_decimal::{Decimal, RoundingStrategy};

/// `amount * percent / 100`, or `None` when the product overflows.
pub fn percent_of(amount: Decimal, percent: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(percent)?
        .checked_div(Decimal::ONE_HUNDRED)
}

/// Round to paise, half away from zero.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to whole rupees, half away from zero.
pub fn round_whole(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Two-decimal display string, e.g. `2124.00`.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", round_currency(amount))
}

/// Quantity display without trailing zeros, e.g. `2` or `1.5`.
pub fn format_quantity(quantity: Decimal) -> String {
    quantity.normalize().to_string()
}
