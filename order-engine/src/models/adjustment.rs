//! Inventory adjustment, move and issue drafts.
//!
//! Rows carry a signed quantity change and never carry tax.

use super::serial::SerialOption;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdjustmentKind {
    /// Add or deduct stock at one location.
    #[default]
    Adjustment,
    /// Transfer stock between two locations.
    Move,
    /// Issue stock out of a location (e.g. to production).
    Issue,
}

impl AdjustmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentKind::Adjustment => "adjustment",
            AdjustmentKind::Move => "move",
            AdjustmentKind::Issue => "issue",
        }
    }
}

impl std::fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdjustmentRow {
    pub product_id: Option<i64>,
    pub product_name: String,
    pub uom: String,
    /// Positive adds stock, negative deducts.
    pub quantity_change: Decimal,
    pub available_quantity: Option<Decimal>,
    pub serial_no_applicable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub serial_options: Vec<SerialOption>,
    pub serial_numbers: Vec<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdjustmentDraft {
    pub kind: AdjustmentKind,
    pub location_id: Option<i64>,
    /// Destination, only for [`AdjustmentKind::Move`].
    pub to_location_id: Option<i64>,
    pub adjustment_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub rows: Vec<AdjustmentRow>,
}

impl AdjustmentDraft {
    /// Copy for the backend with candidate serials stripped.
    pub fn for_submission(&self) -> AdjustmentDraft {
        AdjustmentDraft {
            rows: self
                .rows
                .iter()
                .map(|row| AdjustmentRow {
                    serial_options: Vec::new(),
                    ..row.clone()
                })
                .collect(),
            ..self.clone()
        }
    }
}
