//! Serial number reservation for serialized products.
//!
//! Candidates are fetched per product and status, narrowed to the chosen
//! location, and the row may only be committed once exactly `|quantity|`
//! serials are selected.

use crate::error::{EngineError, ValidationError, ValidationRule};
use crate::models::{AdjustmentRow, LineItem, SerialOption, SerialStatus};
use crate::notice::{Notice, Notifier};
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::{info, instrument, warn};

/// Where candidate serial numbers come from (the backend, in practice).
#[async_trait]
pub trait SerialSource: Send + Sync {
    async fn serials_by_status(
        &self,
        product_id: i64,
        status: SerialStatus,
    ) -> Result<Vec<SerialOption>, EngineError>;
}

/// A row that may need serial numbers.
pub trait SerialTracked {
    fn label(&self) -> &str;
    fn serial_no_applicable(&self) -> bool;
    fn signed_quantity(&self) -> Decimal;
    fn serial_options(&self) -> &[SerialOption];
    fn serial_numbers(&self) -> &[String];
    fn set_serial_numbers(&mut self, serials: Vec<String>);

    /// `|quantity|`, or `None` when the quantity is fractional.
    fn required_serial_count(&self) -> Option<usize> {
        let quantity = self.signed_quantity();
        if quantity.fract().is_zero() {
            quantity.abs().to_usize()
        } else {
            None
        }
    }
}

impl SerialTracked for LineItem {
    fn label(&self) -> &str {
        &self.product_name
    }

    fn serial_no_applicable(&self) -> bool {
        self.serial_no_applicable
    }

    fn signed_quantity(&self) -> Decimal {
        self.quantity
    }

    fn serial_options(&self) -> &[SerialOption] {
        &self.serial_options
    }

    fn serial_numbers(&self) -> &[String] {
        &self.serial_numbers
    }

    fn set_serial_numbers(&mut self, serials: Vec<String>) {
        self.serial_numbers = serials;
    }
}

impl SerialTracked for AdjustmentRow {
    fn label(&self) -> &str {
        &self.product_name
    }

    fn serial_no_applicable(&self) -> bool {
        self.serial_no_applicable
    }

    fn signed_quantity(&self) -> Decimal {
        self.quantity_change
    }

    fn serial_options(&self) -> &[SerialOption] {
        &self.serial_options
    }

    fn serial_numbers(&self) -> &[String] {
        &self.serial_numbers
    }

    fn set_serial_numbers(&mut self, serials: Vec<String>) {
        self.serial_numbers = serials;
    }
}

/// Serials are fetched once the product is serialized, a non-zero quantity
/// is entered and a location is chosen.
pub fn needs_serial_fetch(
    serial_no_applicable: bool,
    quantity: Decimal,
    location_id: Option<i64>,
) -> bool {
    serial_no_applicable && !quantity.is_zero() && location_id.is_some()
}

/// Fetch candidate serials for a product at a location.
///
/// Never fails: an empty result raises a warning and a lookup failure raises
/// an error notice, both leaving the row editable with no candidates.
#[instrument(skip(source, notifier))]
pub async fn fetch_candidate_serials<S>(
    source: &S,
    notifier: &dyn Notifier,
    product_id: i64,
    location_id: i64,
    status: SerialStatus,
) -> Vec<SerialOption>
where
    S: SerialSource + ?Sized,
{
    match source.serials_by_status(product_id, status).await {
        Ok(serials) => {
            let candidates: Vec<SerialOption> = serials
                .into_iter()
                .filter(|serial| serial.location_id == Some(location_id))
                .collect();

            if candidates.is_empty() {
                warn!("No serial numbers available at location");
                notifier.notify(Notice::warning(format!(
                    "No {} serial numbers found for this product at the selected location",
                    status.as_str().replace('_', " ")
                )));
            } else {
                info!(count = candidates.len(), "Candidate serial numbers loaded");
            }
            candidates
        }
        Err(e) => {
            warn!(error = %e, "Failed to load serial numbers");
            notifier.notify(Notice::error(format!("Failed to load serial numbers: {}", e)));
            Vec::new()
        }
    }
}

/// Replace the row's selected serials.
///
/// Rejects duplicates, serials outside the loaded candidates (when any are
/// loaded) and selections larger than `|quantity|`.
pub fn select_serials<T: SerialTracked>(
    row: &mut T,
    selected: Vec<String>,
) -> Result<(), EngineError> {
    if !row.serial_no_applicable() {
        return Err(EngineError::InvalidSelection(format!(
            "{} does not track serial numbers",
            row.label()
        )));
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = selected.iter().find(|s| !seen.insert(s.as_str())) {
        return Err(EngineError::InvalidSelection(format!(
            "Serial number {} selected more than once",
            duplicate
        )));
    }

    if !row.serial_options().is_empty() {
        let known: HashSet<&str> = row
            .serial_options()
            .iter()
            .map(|o| o.serial_no.as_str())
            .collect();
        if let Some(unknown) = selected.iter().find(|s| !known.contains(s.as_str())) {
            return Err(EngineError::InvalidSelection(format!(
                "Serial number {} is not available at this location",
                unknown
            )));
        }
    }

    if let Some(required) = row.required_serial_count() {
        if selected.len() > required {
            return Err(EngineError::InvalidSelection(format!(
                "Select at most {} serial numbers for {}",
                required,
                row.label()
            )));
        }
    }

    row.set_serial_numbers(selected);
    Ok(())
}

/// The commit-time rule: a serialized row needs exactly `|quantity|` serials.
pub fn ensure_serial_cardinality<T: SerialTracked>(
    row: &T,
    row_number: usize,
) -> Result<(), ValidationError> {
    if !row.serial_no_applicable() {
        return Ok(());
    }

    let selected = row.serial_numbers().len();
    match row.required_serial_count() {
        Some(required) if required == selected => Ok(()),
        Some(required) => Err(ValidationError::for_row(
            ValidationRule::SerialCount,
            row_number,
            format!(
                "Row {} ({}): select exactly {} serial numbers ({} selected)",
                row_number,
                row.label(),
                required,
                selected
            ),
        )),
        None => Err(ValidationError::for_row(
            ValidationRule::SerialCount,
            row_number,
            format!(
                "Row {} ({}): quantity must be a whole number for serialized products",
                row_number,
                row.label()
            ),
        )),
    }
}
