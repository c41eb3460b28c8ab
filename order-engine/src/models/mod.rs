//! Domain models for order composition.

mod adjustment;
mod line_item;
mod order;
mod payment;
mod product;
mod serial;
mod tax;

pub use adjustment::{AdjustmentDraft, AdjustmentKind, AdjustmentRow};
pub use line_item::{LineItem, VehicleIdentity};
pub use order::{
    OrderHeader, OrderKind, OrderRecord, OrderTotals, PurchaseOrderHeader, PurchaseOrderRecord,
    PurchaseOrderStatus, SalesOrderHeader, SalesOrderRecord, SalesOrderStatus,
};
pub use payment::{Payment, PaymentMode, PaymentSummary};
pub use product::{Product, ProductCatalog};
pub use serial::{SerialOption, SerialStatus};
pub use tax::{resolve_tax_type, GstSplit, TaxType, TaxTypeResolution};
