//! Line item model shared by sales orders and purchase orders.

use super::serial::SerialOption;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identity of a finished vehicle sold or bought as a single unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VehicleIdentity {
    pub chassis_no: String,
    pub motor_no: String,
    pub controller_no: String,
    pub color: String,
    pub charger_no: String,
    pub battery_no: String,
}

impl VehicleIdentity {
    /// Labels of the fields that are still blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("chassis number", &self.chassis_no),
            ("motor number", &self.motor_no),
            ("controller number", &self.controller_no),
            ("color", &self.color),
            ("charger number", &self.charger_no),
            ("battery number", &self.battery_no),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
        .collect()
    }
}

/// One product row on an order.
///
/// Amount fields are derived by [`crate::compute`]; the percentages are
/// mutually exclusive by tax type (CGST+SGST for INTRA, IGST for INTER).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    pub product_id: Option<i64>,
    pub product_name: String,
    pub uom: String,
    pub hsn_code: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub discount_amount: Decimal,
    pub cgst_percent: Decimal,
    pub sgst_percent: Decimal,
    pub igst_percent: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub igst_amount: Decimal,
    pub total_amount: Decimal,
    /// Full GST rate of the product, kept so the row can be re-split.
    pub gst_percentage: Decimal,
    pub available_quantity: Option<Decimal>,
    pub serial_no_applicable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub serial_options: Vec<SerialOption>,
    pub serial_numbers: Vec<String>,
    #[serde(rename = "isFinalVeichle")]
    pub is_final_vehicle: bool,
    #[serde(flatten)]
    pub vehicle: VehicleIdentity,
}

impl LineItem {
    pub fn has_product(&self) -> bool {
        self.product_id.is_some()
    }

    /// `quantity * unit_price`, before discount. `None` on overflow.
    pub fn gross_amount(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_price)
    }

    /// Amount the tax percentages apply to.
    pub fn taxable_amount(&self) -> Option<Decimal> {
        self.gross_amount()?.checked_sub(self.discount_amount)
    }

    /// Copy suitable for the backend: candidate serials are client-only.
    pub fn for_submission(&self) -> LineItem {
        LineItem {
            serial_options: Vec::new(),
            ..self.clone()
        }
    }
}
