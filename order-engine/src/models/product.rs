//! Product catalog snapshot used when a product is picked for a row.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub product_id: i64,
    pub product_name: String,
    pub uom: String,
    pub hsn_code: String,
    pub unit_price: Decimal,
    pub gst_percentage: Decimal,
    pub serial_no_applicable: bool,
    #[serde(rename = "isFinalVeichle")]
    pub is_final_vehicle: bool,
    /// Stock on hand when the catalog was fetched.
    pub available_quantity: Option<Decimal>,
}

/// Lookup of products by id.
pub trait ProductCatalog {
    fn find_product(&self, product_id: i64) -> Option<&Product>;
}

impl ProductCatalog for [Product] {
    fn find_product(&self, product_id: i64) -> Option<&Product> {
        self.iter().find(|p| p.product_id == product_id)
    }
}

impl ProductCatalog for HashMap<i64, Product> {
    fn find_product(&self, product_id: i64) -> Option<&Product> {
        self.get(&product_id)
    }
}
