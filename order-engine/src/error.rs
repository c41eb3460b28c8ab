use thiserror::Error;

/// Which submission rule rejected a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRule {
    NoItems,
    NoProduct,
    NonPositiveQuantity,
    ZeroQuantity,
    SerialCount,
    VehicleDetails,
    InsufficientStock,
    TaxMismatch,
    MissingLocation,
    SameLocation,
    PaymentAmount,
}

/// A rejected draft. `message` is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub rule: ValidationRule,
    /// 1-based row number, when the failure belongs to a single row.
    pub row: Option<usize>,
    pub message: String,
}

impl ValidationError {
    pub fn new(rule: ValidationRule, message: impl Into<String>) -> Self {
        Self {
            rule,
            row: None,
            message: message.into(),
        }
    }

    pub fn for_row(rule: ValidationRule, row: usize, message: impl Into<String>) -> Self {
        Self {
            rule,
            row: Some(row),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Product {0} not found")]
    ProductNotFound(i64),

    #[error("Serial number lookup failed: {0}")]
    SerialSource(String),

    #[error("Action {action} is not allowed when status is {from}")]
    TransitionNotAllowed { from: String, action: String },

    #[error("Role {role} may not {action} when status is {from}")]
    RoleNotPermitted {
        from: String,
        action: String,
        role: String,
    },

    #[error("{0}")]
    InvalidSelection(String),

    #[error("No line item at position {0}")]
    NoSuchItem(usize),

    #[error("Order must be validated before it can be submitted")]
    NotValidated,

    #[error("Order has already been submitted")]
    AlreadySubmitted,

    #[error("Amount is too large to calculate")]
    AmountOverflow,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
