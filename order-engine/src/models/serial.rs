use serde::{Deserialize, Serialize};

/// Stock status of a serial number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerialStatus {
    #[default]
    InStock,
    Reserved,
    Sold,
    Issued,
    #[serde(other)]
    Other,
}

impl SerialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SerialStatus::InStock => "in_stock",
            SerialStatus::Reserved => "reserved",
            SerialStatus::Sold => "sold",
            SerialStatus::Issued => "issued",
            SerialStatus::Other => "other",
        }
    }
}

impl std::fmt::Display for SerialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A serial number the backend reports for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerialOption {
    pub serial_no: String,
    pub product_id: i64,
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub status: SerialStatus,
}
