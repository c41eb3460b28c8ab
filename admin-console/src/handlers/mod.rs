pub mod app;
pub mod auth;
pub mod documents;
pub mod inventory;
pub mod line_items;
pub mod metrics;
pub mod purchase_orders;
pub mod sales_orders;

use crate::services::metrics::record_submission;
use order_engine::models::{LineItem, OrderHeader, OrderTotals, TaxType};
use order_engine::{EngineError, Notice, Notifier, OrderComposer, ValidationError};
use serde::Serialize;
use serde_json::Value;
use service_core::error::AppError;

/// A payload plus the notices raised while producing it.
#[derive(Debug, Serialize)]
pub struct WithNotices<T> {
    pub data: T,
    pub notices: Vec<Notice>,
}

/// What the console returns after the backend accepted an order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedOrder {
    pub result: Value,
    pub totals: OrderTotals,
}

pub fn engine_error(err: EngineError) -> AppError {
    match err {
        EngineError::ProductNotFound(_) => AppError::NotFound(anyhow::Error::new(err)),
        EngineError::RoleNotPermitted { .. } => AppError::Forbidden(anyhow::Error::new(err)),
        EngineError::NoSuchItem(_) => AppError::BadRequest(anyhow::Error::new(err)),
        EngineError::NotValidated | EngineError::AlreadySubmitted => {
            AppError::Conflict(anyhow::Error::new(err))
        }
        EngineError::SerialSource(message) => AppError::BadGateway(message),
        EngineError::Validation(e) => validation_error(e),
        EngineError::TransitionNotAllowed { .. }
        | EngineError::InvalidSelection(_)
        | EngineError::AmountOverflow => AppError::RuleViolation(err.to_string()),
    }
}

pub fn validation_error(err: ValidationError) -> AppError {
    AppError::RuleViolation(err.message)
}

/// Build a composer from a submitted draft, settle its tax type and run the
/// submission rules. Nothing reaches the backend unless this succeeds.
pub fn compose_validated<H: OrderHeader + Clone>(
    header: H,
    items: Vec<LineItem>,
    manual_tax_type: Option<TaxType>,
    notifier: &dyn Notifier,
) -> Result<OrderComposer<H>, AppError> {
    let mut composer = OrderComposer::with_items(header, items).map_err(engine_error)?;

    let resolution = composer
        .resolve_tax_type(manual_tax_type)
        .map_err(engine_error)?;
    if let Some(warning) = resolution.warning {
        notifier.notify(Notice::warning(warning));
    }

    if let Err(e) = composer.validate() {
        tracing::info!(order_kind = %H::KIND, rule = ?e.rule, "Submission rejected by validation");
        record_submission(H::KIND.as_str(), "invalid");
        return Err(validation_error(e));
    }
    Ok(composer)
}
