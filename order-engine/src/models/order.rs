//! Order headers, statuses and totals.

use super::tax::TaxType;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of order being composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderKind {
    Sales,
    Purchase,
}

impl OrderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderKind::Sales => "sales",
            OrderKind::Purchase => "purchase",
        }
    }
}

impl std::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sales order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SalesOrderStatus {
    Confirmed,
    Cancelled,
}

impl SalesOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalesOrderStatus::Confirmed => "CONFIRMED",
            SalesOrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for SalesOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Purchase order status, spelled the way the backend stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseOrderStatus {
    #[serde(rename = "DRAFT")]
    Draft,
    #[serde(rename = "SENT TO SUPPLIER")]
    SentToSupplier,
    #[serde(rename = "VALIDATE GOODS")]
    ValidateGoods,
    #[serde(rename = "GOOD RECEIVED PART")]
    GoodReceivedPart,
    #[serde(rename = "GOOD RECEIVED FULL")]
    GoodReceivedFull,
    #[serde(rename = "INVOICED")]
    Invoiced,
    #[serde(rename = "CLOSED")]
    Closed,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Draft => "DRAFT",
            PurchaseOrderStatus::SentToSupplier => "SENT TO SUPPLIER",
            PurchaseOrderStatus::ValidateGoods => "VALIDATE GOODS",
            PurchaseOrderStatus::GoodReceivedPart => "GOOD RECEIVED PART",
            PurchaseOrderStatus::GoodReceivedFull => "GOOD RECEIVED FULL",
            PurchaseOrderStatus::Invoiced => "INVOICED",
            PurchaseOrderStatus::Closed => "CLOSED",
        }
    }
}

impl std::fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order-level sums over the line items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub taxable_amount: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub igst_amount: Decimal,
    pub total_tax: Decimal,
    /// Unrounded; this is what the backend receives.
    pub grand_total: Decimal,
    pub round_difference: Decimal,
    pub rounded_grand_total: Decimal,
}

/// Header fields an order composer needs to know about.
pub trait OrderHeader {
    const KIND: OrderKind;

    fn tax_type(&self) -> TaxType;

    fn set_tax_type(&mut self, tax_type: TaxType);

    /// State codes of the counterparty and the delivery address.
    fn state_codes(&self) -> (Option<&str>, Option<&str>);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesOrderHeader {
    pub sales_order_id: Option<i64>,
    pub order_no: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub customer_id: Option<i64>,
    pub customer_name: String,
    pub customer_gstin: Option<String>,
    pub billing_address: String,
    pub billing_state_code: Option<String>,
    pub delivery_address: String,
    pub delivery_state_code: Option<String>,
    pub location_id: Option<i64>,
    pub tax_type: TaxType,
    pub status: Option<SalesOrderStatus>,
    pub remarks: Option<String>,
}

impl OrderHeader for SalesOrderHeader {
    const KIND: OrderKind = OrderKind::Sales;

    fn tax_type(&self) -> TaxType {
        self.tax_type
    }

    fn set_tax_type(&mut self, tax_type: TaxType) {
        self.tax_type = tax_type;
    }

    fn state_codes(&self) -> (Option<&str>, Option<&str>) {
        (
            self.billing_state_code.as_deref(),
            self.delivery_state_code.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseOrderHeader {
    pub purchase_order_id: Option<i64>,
    pub po_number: Option<String>,
    pub po_date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub vendor_id: Option<i64>,
    pub vendor_name: String,
    pub vendor_gstin: Option<String>,
    pub vendor_address: String,
    pub vendor_state_code: Option<String>,
    pub delivery_address: String,
    pub delivery_state_code: Option<String>,
    pub tax_type: TaxType,
    pub status: Option<PurchaseOrderStatus>,
    pub remarks: Option<String>,
}

impl OrderHeader for PurchaseOrderHeader {
    const KIND: OrderKind = OrderKind::Purchase;

    fn tax_type(&self) -> TaxType {
        self.tax_type
    }

    fn set_tax_type(&mut self, tax_type: TaxType) {
        self.tax_type = tax_type;
    }

    fn state_codes(&self) -> (Option<&str>, Option<&str>) {
        (
            self.vendor_state_code.as_deref(),
            self.delivery_state_code.as_deref(),
        )
    }
}

/// A stored order as listed by the backend: header plus its totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord<H> {
    #[serde(flatten)]
    pub header: H,
    #[serde(flatten)]
    pub totals: OrderTotals,
}

pub type SalesOrderRecord = OrderRecord<SalesOrderHeader>;
pub type PurchaseOrderRecord = OrderRecord<PurchaseOrderHeader>;
