//! order-engine: line item computation, order totals and submission rules
//! shared by the sales order, purchase order and inventory screens.

pub mod adjustments;
pub mod aggregate;
pub mod composer;
pub mod compute;
pub mod error;
pub mod models;
pub mod money;
pub mod notice;
pub mod payments;
pub mod serials;
pub mod validation;
pub mod workflow;

pub use aggregate::aggregate;
pub use composer::{ComposePhase, OrderComposer, Submission};
pub use compute::{apply_tax_type, derive_amounts, recompute, rederive, DerivedAmounts, FieldChange};
pub use error::{EngineError, ValidationError, ValidationRule};
pub use notice::{Notice, NoticeBuffer, Notifier, Severity};
pub use serials::{SerialSource, SerialTracked};
pub use workflow::{available_actions, transition, Role, Workflow};
