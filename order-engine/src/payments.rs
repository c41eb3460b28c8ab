//! Payments received against sales orders.

use crate::error::{ValidationError, ValidationRule};
use crate::models::{Payment, PaymentSummary};
use crate::money::{format_amount, round_currency};
use rust_decimal::Decimal;

/// Paid and outstanding amounts; the balance never goes below zero.
pub fn summarize_payments(grand_total: Decimal, payments: &[Payment]) -> PaymentSummary {
    let paid: Decimal = payments.iter().map(|p| p.amount).sum();
    PaymentSummary {
        grand_total,
        paid,
        balance: (grand_total - paid).max(Decimal::ZERO),
    }
}

/// A payment must be positive and may not exceed the outstanding balance.
pub fn validate_payment(payment: &Payment, balance: Decimal) -> Result<(), ValidationError> {
    if payment.amount <= Decimal::ZERO {
        return Err(ValidationError::new(
            ValidationRule::PaymentAmount,
            "Payment amount must be greater than zero",
        ));
    }
    if round_currency(payment.amount) > round_currency(balance) {
        return Err(ValidationError::new(
            ValidationRule::PaymentAmount,
            format!(
                "Payment of {} exceeds the outstanding balance of {}",
                format_amount(payment.amount),
                format_amount(balance)
            ),
        ));
    }
    Ok(())
}
