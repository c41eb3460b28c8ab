//! In-memory order composition: `DRAFT -> VALIDATED -> SUBMITTED`.

use crate::aggregate::aggregate;
use crate::compute::{apply_tax_type, rederive};
use crate::error::{EngineError, ValidationError};
use crate::models::{
    resolve_tax_type, LineItem, OrderHeader, OrderKind, OrderTotals, TaxType, TaxTypeResolution,
};
use crate::validation::{validate_row_commit, validate_submission};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComposePhase {
    Draft,
    Validated,
    Submitted,
}

/// Totals as sent to the backend; the rounded figures are display-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub taxable_amount: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub igst_amount: Decimal,
    pub total_tax: Decimal,
    pub grand_total: Decimal,
}

impl From<&OrderTotals> for SubmissionTotals {
    fn from(totals: &OrderTotals) -> Self {
        Self {
            subtotal: totals.subtotal,
            discount_amount: totals.discount_amount,
            taxable_amount: totals.taxable_amount,
            cgst_amount: totals.cgst_amount,
            sgst_amount: totals.sgst_amount,
            igst_amount: totals.igst_amount,
            total_tax: totals.total_tax,
            grand_total: totals.grand_total,
        }
    }
}

/// The whole order as one payload: header, totals and a flat item list.
#[derive(Debug, Clone, Serialize)]
pub struct Submission<H> {
    #[serde(flatten)]
    pub header: H,
    #[serde(flatten)]
    pub totals: SubmissionTotals,
    pub items: Vec<LineItem>,
}

/// Holds an order while it is being composed.
///
/// Any edit sends the order back to `DRAFT`; a submission payload is only
/// produced from `VALIDATED`.
#[derive(Debug, Clone)]
pub struct OrderComposer<H> {
    header: H,
    items: Vec<LineItem>,
    phase: ComposePhase,
}

impl<H: OrderHeader + Clone> OrderComposer<H> {
    pub fn new(header: H) -> Self {
        Self {
            header,
            items: Vec::new(),
            phase: ComposePhase::Draft,
        }
    }

    /// Start from an existing item list, such as a draft sent back by the
    /// browser. Stored amounts on the rows are re-derived, not trusted.
    pub fn with_items(header: H, items: Vec<LineItem>) -> Result<Self, EngineError> {
        let items = items
            .iter()
            .map(rederive)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            header,
            items,
            phase: ComposePhase::Draft,
        })
    }

    pub fn kind(&self) -> OrderKind {
        H::KIND
    }

    pub fn header(&self) -> &H {
        &self.header
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn phase(&self) -> ComposePhase {
        self.phase
    }

    pub fn tax_type(&self) -> TaxType {
        self.header.tax_type()
    }

    pub fn totals(&self) -> Result<OrderTotals, EngineError> {
        aggregate(&self.items)
    }

    fn touch(&mut self) -> Result<(), EngineError> {
        if self.phase == ComposePhase::Submitted {
            return Err(EngineError::AlreadySubmitted);
        }
        self.phase = ComposePhase::Draft;
        Ok(())
    }

    /// Append a row; returns its index.
    pub fn add_item(&mut self, item: LineItem) -> Result<usize, EngineError> {
        let item = rederive(&item)?;
        validate_row_commit(&item, self.items.len() + 1)?;
        self.touch()?;
        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    pub fn update_item(&mut self, index: usize, item: LineItem) -> Result<(), EngineError> {
        if index >= self.items.len() {
            return Err(EngineError::NoSuchItem(index));
        }
        let item = rederive(&item)?;
        validate_row_commit(&item, index + 1)?;
        self.touch()?;
        self.items[index] = item;
        Ok(())
    }

    pub fn remove_item(&mut self, index: usize) -> Result<LineItem, EngineError> {
        if index >= self.items.len() {
            return Err(EngineError::NoSuchItem(index));
        }
        self.touch()?;
        Ok(self.items.remove(index))
    }

    /// Change the order's tax type and re-split every row.
    pub fn set_tax_type(&mut self, tax_type: TaxType) -> Result<(), EngineError> {
        self.touch()?;
        let items = self
            .items
            .iter()
            .map(|item| apply_tax_type(item, tax_type))
            .collect::<Result<Vec<_>, _>>()?;
        self.header.set_tax_type(tax_type);
        self.items = items;
        Ok(())
    }

    /// Derive the tax type from the header's state codes, honouring a
    /// manual override. Rows are re-split only when the type changes, so
    /// hand-edited percentages survive.
    pub fn resolve_tax_type(
        &mut self,
        manual: Option<TaxType>,
    ) -> Result<TaxTypeResolution, EngineError> {
        let (party, delivery) = self.header.state_codes();
        let resolution = resolve_tax_type(party, delivery, manual);
        if let Some(warning) = &resolution.warning {
            warn!(order_kind = %H::KIND, "{}", warning);
        }
        if resolution.tax_type != self.header.tax_type() {
            self.set_tax_type(resolution.tax_type)?;
        }
        Ok(resolution)
    }

    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_submission(H::KIND, self.header.tax_type(), &self.items)?;
        if self.phase == ComposePhase::Draft {
            self.phase = ComposePhase::Validated;
        }
        Ok(())
    }

    pub fn submission(&self) -> Result<Submission<H>, EngineError> {
        match self.phase {
            ComposePhase::Draft => Err(EngineError::NotValidated),
            ComposePhase::Submitted => Err(EngineError::AlreadySubmitted),
            ComposePhase::Validated => Ok(Submission {
                header: self.header.clone(),
                totals: SubmissionTotals::from(&self.totals()?),
                items: self.items.iter().map(LineItem::for_submission).collect(),
            }),
        }
    }

    /// Record that the backend accepted the submission.
    pub fn mark_submitted(&mut self) -> Result<(), EngineError> {
        match self.phase {
            ComposePhase::Validated => {
                self.phase = ComposePhase::Submitted;
                info!(order_kind = %H::KIND, items = self.items.len(), "Order submitted");
                Ok(())
            }
            ComposePhase::Draft => Err(EngineError::NotValidated),
            ComposePhase::Submitted => Err(EngineError::AlreadySubmitted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::sum_line_totals;
    use crate::models::{SalesOrderHeader, SerialOption};
    use rust_decimal_macros::dec;

    fn header() -> SalesOrderHeader {
        SalesOrderHeader {
            customer_name: "Acme Motors".to_string(),
            billing_state_code: Some("29".to_string()),
            delivery_state_code: Some("29".to_string()),
            ..Default::default()
        }
    }

    fn row(quantity: Decimal) -> LineItem {
        apply_tax_type(
            &LineItem {
                product_id: Some(1),
                product_name: "Controller".to_string(),
                quantity,
                unit_price: dec!(1000),
                discount_percent: dec!(10),
                gst_percentage: dec!(18),
                ..Default::default()
            },
            TaxType::Intra,
        )
        .unwrap()
    }

    #[test]
    fn phases_advance_and_reset_on_edit() {
        let mut composer = OrderComposer::new(header());
        composer.add_item(row(dec!(2))).unwrap();
        assert_eq!(composer.phase(), ComposePhase::Draft);
        assert!(matches!(composer.submission(), Err(EngineError::NotValidated)));

        composer.validate().unwrap();
        assert_eq!(composer.phase(), ComposePhase::Validated);

        composer.add_item(row(dec!(1))).unwrap();
        assert_eq!(composer.phase(), ComposePhase::Draft);

        composer.validate().unwrap();
        composer.mark_submitted().unwrap();
        assert_eq!(composer.phase(), ComposePhase::Submitted);
        assert!(matches!(
            composer.add_item(row(dec!(1))),
            Err(EngineError::AlreadySubmitted)
        ));
    }

    #[test]
    fn serialized_row_needs_serials_before_commit() {
        let mut composer = OrderComposer::new(header());
        let mut item = row(dec!(2));
        item.serial_no_applicable = true;
        item.serial_numbers = vec!["S1".to_string()];

        assert!(matches!(
            composer.add_item(item.clone()),
            Err(EngineError::Validation(_))
        ));

        item.serial_numbers.push("S2".to_string());
        assert_eq!(composer.add_item(item).unwrap(), 0);
    }

    #[test]
    fn submission_carries_unrounded_totals_and_no_candidates() {
        let mut composer = OrderComposer::new(header());
        let mut item = row(dec!(2));
        item.serial_options = vec![SerialOption {
            serial_no: "S1".to_string(),
            product_id: 1,
            location_id: None,
            status: Default::default(),
        }];
        composer.add_item(item).unwrap();
        composer.validate().unwrap();

        let submission = composer.submission().unwrap();
        assert_eq!(submission.totals.grand_total, dec!(2124));
        assert!(submission.items[0].serial_options.is_empty());

        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["customerName"], "Acme Motors");
        assert!(json.get("roundedGrandTotal").is_none());
        assert_eq!(json["items"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn tax_type_switch_retaxes_all_rows() {
        let mut composer = OrderComposer::new(SalesOrderHeader {
            billing_state_code: Some("29".to_string()),
            delivery_state_code: Some("27".to_string()),
            ..header()
        });
        composer.add_item(row(dec!(2))).unwrap();

        let resolution = composer.resolve_tax_type(None).unwrap();
        assert_eq!(resolution.tax_type, TaxType::Inter);
        assert_eq!(composer.header().tax_type, TaxType::Inter);

        let totals = composer.totals().unwrap();
        assert_eq!(totals.igst_amount, dec!(324));
        assert_eq!(totals.cgst_amount, Decimal::ZERO);
        assert_eq!(totals.grand_total, dec!(2124));
        composer.validate().unwrap();
    }

    #[test]
    fn out_of_range_edits_are_rejected() {
        let mut composer = OrderComposer::new(header());
        assert!(matches!(
            composer.update_item(0, row(dec!(1))),
            Err(EngineError::NoSuchItem(0))
        ));
        assert!(matches!(composer.remove_item(3), Err(EngineError::NoSuchItem(3))));
    }

    #[test]
    fn client_amounts_are_rederived_on_entry() {
        let stale = LineItem {
            discount_amount: Decimal::ZERO,
            cgst_amount: dec!(1),
            sgst_amount: dec!(1),
            total_amount: dec!(5),
            ..row(dec!(2))
        };
        let mut composer = OrderComposer::with_items(header(), vec![stale.clone()]).unwrap();
        composer.add_item(stale.clone()).unwrap();
        composer.update_item(0, stale).unwrap();
        composer.validate().unwrap();

        let submission = composer.submission().unwrap();
        for item in &submission.items {
            assert_eq!(item.discount_amount, dec!(200));
            assert_eq!(item.cgst_amount, dec!(162));
            assert_eq!(item.total_amount, dec!(2124));
        }
        assert_eq!(submission.totals.grand_total, sum_line_totals(&submission.items));
        assert_eq!(submission.totals.grand_total, dec!(4248));
    }

    #[test]
    fn overflowing_row_is_refused() {
        let huge = LineItem {
            quantity: dec!(1000000000000000),
            unit_price: dec!(1000000000000000),
            ..row(dec!(1))
        };
        assert!(matches!(
            OrderComposer::with_items(header(), vec![huge.clone()]),
            Err(EngineError::AmountOverflow)
        ));

        let mut composer = OrderComposer::new(header());
        assert!(matches!(composer.add_item(huge), Err(EngineError::AmountOverflow)));
        assert!(composer.items().is_empty());
    }
}
