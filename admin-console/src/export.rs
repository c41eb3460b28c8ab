//! CSV export of order lists.

use order_engine::models::{PurchaseOrderRecord, SalesOrderRecord};
use order_engine::money::format_amount;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn build_csv(headers: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let mut lines = vec![headers.join(",")];
    lines.extend(rows.map(|row| {
        row.iter()
            .map(|field| escape_field(field))
            .collect::<Vec<_>>()
            .join(",")
    }));
    let mut csv = lines.join("\r\n");
    csv.push_str("\r\n");
    csv
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

pub fn sales_orders_csv(orders: &[SalesOrderRecord]) -> String {
    build_csv(
        &[
            "Order No",
            "Order Date",
            "Customer",
            "GSTIN",
            "Tax Type",
            "Status",
            "Taxable",
            "CGST",
            "SGST",
            "IGST",
            "Grand Total",
            "Rounded Total",
        ],
        orders.iter().map(|order| {
            let h = &order.header;
            let t = &order.totals;
            vec![
                opt(&h.order_no),
                opt(&h.order_date),
                h.customer_name.clone(),
                opt(&h.customer_gstin),
                h.tax_type.to_string(),
                opt(&h.status),
                format_amount(t.taxable_amount),
                format_amount(t.cgst_amount),
                format_amount(t.sgst_amount),
                format_amount(t.igst_amount),
                format_amount(t.grand_total),
                format_amount(t.rounded_grand_total),
            ]
        }),
    )
}

pub fn purchase_orders_csv(orders: &[PurchaseOrderRecord]) -> String {
    build_csv(
        &[
            "PO Number",
            "PO Date",
            "Expected Delivery",
            "Vendor",
            "GSTIN",
            "Tax Type",
            "Status",
            "Taxable",
            "Total Tax",
            "Grand Total",
        ],
        orders.iter().map(|order| {
            let h = &order.header;
            let t = &order.totals;
            vec![
                opt(&h.po_number),
                opt(&h.po_date),
                opt(&h.expected_delivery_date),
                h.vendor_name.clone(),
                opt(&h.vendor_gstin),
                h.tax_type.to_string(),
                opt(&h.status),
                format_amount(t.taxable_amount),
                format_amount(t.total_tax),
                format_amount(t.grand_total),
            ]
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_engine::models::{PurchaseOrderHeader, PurchaseOrderStatus, SalesOrderHeader};
    use rust_decimal_macros::dec;

    #[test]
    fn fields_are_quoted_when_needed() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("Acme, Pune"), "\"Acme, Pune\"");
        assert_eq!(escape_field("6\" rim"), "\"6\"\" rim\"");
    }

    #[test]
    fn sales_export_has_header_and_rows() {
        let mut order = SalesOrderRecord {
            header: SalesOrderHeader {
                order_no: Some("SO-1".to_string()),
                customer_name: "Acme Motors, Pune".to_string(),
                ..Default::default()
            },
            totals: Default::default(),
        };
        order.totals.grand_total = dec!(2124);
        order.totals.rounded_grand_total = dec!(2124);

        let csv = sales_orders_csv(&[order]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Order No,Order Date,Customer"));
        assert!(lines[1].starts_with("SO-1,,\"Acme Motors, Pune\",,INTRA,"));
        assert!(lines[1].ends_with("2124.00,2124.00"));
    }

    #[test]
    fn purchase_status_uses_backend_spelling() {
        let order = PurchaseOrderRecord {
            header: PurchaseOrderHeader {
                po_number: Some("PO-7".to_string()),
                status: Some(PurchaseOrderStatus::SentToSupplier),
                ..Default::default()
            },
            totals: Default::default(),
        };
        assert!(purchase_orders_csv(&[order]).contains("SENT TO SUPPLIER"));
    }
}
