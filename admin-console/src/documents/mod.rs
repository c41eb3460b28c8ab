//! Printable A4 views of sales invoices and purchase orders.
//!
//! Builders are pure: they take the stored header and items and produce
//! display strings, recomputing totals from the items.

pub mod words;

use order_engine::{aggregate, EngineError};
use order_engine::models::{LineItem, PurchaseOrderRecord, SalesOrderRecord, TaxType};
use order_engine::money::{format_amount, format_quantity};

pub use words::amount_in_words;

#[derive(Debug, Clone)]
pub struct DocumentRow {
    pub index: usize,
    pub product_name: String,
    pub hsn_code: String,
    pub uom: String,
    pub quantity: String,
    pub unit_price: String,
    pub discount_amount: String,
    pub taxable_amount: String,
    pub cgst_percent: String,
    pub cgst_amount: String,
    pub sgst_percent: String,
    pub sgst_amount: String,
    pub igst_percent: String,
    pub igst_amount: String,
    pub total_amount: String,
    /// Serials and, for vehicles, chassis/motor numbers.
    pub identifiers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DocumentTotals {
    pub subtotal: String,
    pub discount_amount: String,
    pub taxable_amount: String,
    pub cgst_amount: String,
    pub sgst_amount: String,
    pub igst_amount: String,
    pub total_tax: String,
    pub grand_total: String,
    pub round_off: String,
    pub rounded_grand_total: String,
    pub amount_in_words: String,
}

#[derive(Debug, Clone)]
pub struct DocumentView {
    pub title: &'static str,
    pub number: String,
    pub date: String,
    pub status: String,
    pub party_label: &'static str,
    pub party_name: String,
    pub party_gstin: String,
    pub party_address: String,
    pub party_state_code: String,
    pub delivery_address: String,
    pub delivery_state_code: String,
    pub tax_type: String,
    /// CGST/SGST columns when true, IGST otherwise.
    pub is_intra: bool,
    pub rows: Vec<DocumentRow>,
    pub totals: DocumentTotals,
    pub remarks: String,
}

fn percent(value: rust_decimal::Decimal) -> String {
    format!("{}%", format_quantity(value))
}

fn document_row(index: usize, item: &LineItem) -> Result<DocumentRow, EngineError> {
    let mut identifiers = item.serial_numbers.clone();
    if item.is_final_vehicle {
        let vehicle = &item.vehicle;
        identifiers.extend(
            [
                ("Chassis", &vehicle.chassis_no),
                ("Motor", &vehicle.motor_no),
                ("Controller", &vehicle.controller_no),
                ("Battery", &vehicle.battery_no),
                ("Charger", &vehicle.charger_no),
                ("Color", &vehicle.color),
            ]
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(label, value)| format!("{}: {}", label, value)),
        );
    }

    let taxable_amount = item.taxable_amount().ok_or(EngineError::AmountOverflow)?;
    Ok(DocumentRow {
        index: index + 1,
        product_name: item.product_name.clone(),
        hsn_code: item.hsn_code.clone(),
        uom: item.uom.clone(),
        quantity: format_quantity(item.quantity),
        unit_price: format_amount(item.unit_price),
        discount_amount: format_amount(item.discount_amount),
        taxable_amount: format_amount(taxable_amount),
        cgst_percent: percent(item.cgst_percent),
        cgst_amount: format_amount(item.cgst_amount),
        sgst_percent: percent(item.sgst_percent),
        sgst_amount: format_amount(item.sgst_amount),
        igst_percent: percent(item.igst_percent),
        igst_amount: format_amount(item.igst_amount),
        total_amount: format_amount(item.total_amount),
        identifiers,
    })
}

fn document_totals(items: &[LineItem]) -> Result<DocumentTotals, EngineError> {
    let totals = aggregate(items)?;
    Ok(DocumentTotals {
        subtotal: format_amount(totals.subtotal),
        discount_amount: format_amount(totals.discount_amount),
        taxable_amount: format_amount(totals.taxable_amount),
        cgst_amount: format_amount(totals.cgst_amount),
        sgst_amount: format_amount(totals.sgst_amount),
        igst_amount: format_amount(totals.igst_amount),
        total_tax: format_amount(totals.total_tax),
        grand_total: format_amount(totals.grand_total),
        round_off: format_amount(totals.round_difference),
        rounded_grand_total: format_amount(totals.rounded_grand_total),
        amount_in_words: amount_in_words(totals.rounded_grand_total),
    })
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

pub fn sales_invoice_view(
    record: &SalesOrderRecord,
    items: &[LineItem],
) -> Result<DocumentView, EngineError> {
    let header = &record.header;
    Ok(DocumentView {
        title: "Tax Invoice",
        number: text(&header.order_no),
        date: header
            .order_date
            .map(|d| d.format("%d-%m-%Y").to_string())
            .unwrap_or_default(),
        status: header.status.map(|s| s.to_string()).unwrap_or_default(),
        party_label: "Bill To",
        party_name: header.customer_name.clone(),
        party_gstin: text(&header.customer_gstin),
        party_address: header.billing_address.clone(),
        party_state_code: text(&header.billing_state_code),
        delivery_address: header.delivery_address.clone(),
        delivery_state_code: text(&header.delivery_state_code),
        tax_type: header.tax_type.to_string(),
        is_intra: header.tax_type == TaxType::Intra,
        rows: items
            .iter()
            .enumerate()
            .map(|(i, item)| document_row(i, item))
            .collect::<Result<_, _>>()?,
        totals: document_totals(items)?,
        remarks: text(&header.remarks),
    })
}

pub fn purchase_order_view(
    record: &PurchaseOrderRecord,
    items: &[LineItem],
) -> Result<DocumentView, EngineError> {
    let header = &record.header;
    Ok(DocumentView {
        title: "Purchase Order",
        number: text(&header.po_number),
        date: header
            .po_date
            .map(|d| d.format("%d-%m-%Y").to_string())
            .unwrap_or_default(),
        status: header.status.map(|s| s.to_string()).unwrap_or_default(),
        party_label: "Vendor",
        party_name: header.vendor_name.clone(),
        party_gstin: text(&header.vendor_gstin),
        party_address: header.vendor_address.clone(),
        party_state_code: text(&header.vendor_state_code),
        delivery_address: header.delivery_address.clone(),
        delivery_state_code: text(&header.delivery_state_code),
        tax_type: header.tax_type.to_string(),
        is_intra: header.tax_type == TaxType::Intra,
        rows: items
            .iter()
            .enumerate()
            .map(|(i, item)| document_row(i, item))
            .collect::<Result<_, _>>()?,
        totals: document_totals(items)?,
        remarks: text(&header.remarks),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use order_engine::apply_tax_type;
    use order_engine::models::{PurchaseOrderHeader, SalesOrderHeader, VehicleIdentity};
    use rust_decimal_macros::dec;

    fn controller(tax_type: TaxType) -> LineItem {
        apply_tax_type(
            &LineItem {
                product_id: Some(1),
                product_name: "Controller".to_string(),
                hsn_code: "8504".to_string(),
                uom: "NOS".to_string(),
                quantity: dec!(2),
                unit_price: dec!(1000),
                discount_percent: dec!(10),
                gst_percentage: dec!(18),
                ..Default::default()
            },
            tax_type,
        )
        .unwrap()
    }

    #[test]
    fn invoice_rows_and_totals_are_formatted() {
        let record = SalesOrderRecord {
            header: SalesOrderHeader {
                order_no: Some("SO-0042".to_string()),
                order_date: NaiveDate::from_ymd_opt(2024, 3, 9),
                customer_name: "Acme Motors".to_string(),
                ..Default::default()
            },
            totals: Default::default(),
        };
        let view = sales_invoice_view(&record, &[controller(TaxType::Intra)]).unwrap();

        assert_eq!(view.number, "SO-0042");
        assert_eq!(view.date, "09-03-2024");
        assert!(view.is_intra);
        let row = &view.rows[0];
        assert_eq!(row.index, 1);
        assert_eq!(row.quantity, "2");
        assert_eq!(row.taxable_amount, "1800.00");
        assert_eq!(row.cgst_percent, "9%");
        assert_eq!(row.cgst_amount, "162.00");
        assert_eq!(view.totals.grand_total, "2124.00");
        assert_eq!(view.totals.round_off, "0.00");
        assert_eq!(
            view.totals.amount_in_words,
            "Rupees Two Thousand One Hundred Twenty Four Only"
        );
    }

    #[test]
    fn purchase_order_uses_igst_columns_for_inter() {
        let record = PurchaseOrderRecord {
            header: PurchaseOrderHeader {
                vendor_name: "Volt Cells".to_string(),
                tax_type: TaxType::Inter,
                ..Default::default()
            },
            totals: Default::default(),
        };
        let view = purchase_order_view(&record, &[controller(TaxType::Inter)]).unwrap();
        assert!(!view.is_intra);
        assert_eq!(view.party_label, "Vendor");
        assert_eq!(view.rows[0].igst_amount, "324.00");
    }

    #[test]
    fn vehicle_identity_is_listed() {
        let mut item = controller(TaxType::Intra);
        item.is_final_vehicle = true;
        item.vehicle = VehicleIdentity {
            chassis_no: "CH9".to_string(),
            motor_no: "MO9".to_string(),
            ..Default::default()
        };
        let row = document_row(0, &item).unwrap();
        assert_eq!(row.identifiers, vec!["Chassis: CH9".to_string(), "Motor: MO9".to_string()]);
    }
}
