use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMode {
    #[default]
    Cash,
    Bank,
    Upi,
    Cheque,
    #[serde(other)]
    Other,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "CASH",
            PaymentMode::Bank => "BANK",
            PaymentMode::Upi => "UPI",
            PaymentMode::Cheque => "CHEQUE",
            PaymentMode::Other => "OTHER",
        }
    }
}

/// Payment received against a sales order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Payment {
    pub payment_id: Option<i64>,
    pub sales_order_id: i64,
    pub amount: Decimal,
    pub payment_mode: PaymentMode,
    pub payment_date: Option<NaiveDate>,
    pub reference_no: Option<String>,
    pub remarks: Option<String>,
}

/// Paid and outstanding amounts of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub grand_total: Decimal,
    pub paid: Decimal,
    pub balance: Decimal,
}
