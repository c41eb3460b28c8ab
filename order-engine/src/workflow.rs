//! Status workflows for sales and purchase orders.
//!
//! Each workflow is a static table of `(from, action) -> to` rows with the
//! roles allowed to take them. Screens ask [`available_actions`] which buttons
//! to show and the console runs [`transition`] before calling the backend.

use crate::error::EngineError;
use crate::models::{PurchaseOrderStatus, SalesOrderStatus};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Manager,
    Purchase,
    Store,
    Accounts,
    Sales,
    #[serde(other)]
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Purchase => "PURCHASE",
            Role::Store => "STORE",
            Role::Accounts => "ACCOUNTS",
            Role::Sales => "SALES",
            Role::Viewer => "VIEWER",
        }
    }

    /// Unknown role names map to `Viewer`, which may take no action.
    pub fn from_string(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Role::Admin,
            "MANAGER" => Role::Manager,
            "PURCHASE" => Role::Purchase,
            "STORE" => Role::Store,
            "ACCOUNTS" => Role::Accounts,
            "SALES" => Role::Sales,
            _ => Role::Viewer,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseOrderAction {
    Edit,
    Send,
    Validate,
    ReceivePart,
    ReceiveFull,
    Invoice,
    Close,
}

impl PurchaseOrderAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderAction::Edit => "EDIT",
            PurchaseOrderAction::Send => "SEND",
            PurchaseOrderAction::Validate => "VALIDATE",
            PurchaseOrderAction::ReceivePart => "RECEIVE_PART",
            PurchaseOrderAction::ReceiveFull => "RECEIVE_FULL",
            PurchaseOrderAction::Invoice => "INVOICE",
            PurchaseOrderAction::Close => "CLOSE",
        }
    }
}

impl std::fmt::Display for PurchaseOrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SalesOrderAction {
    Edit,
    Cancel,
}

impl SalesOrderAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalesOrderAction::Edit => "EDIT",
            SalesOrderAction::Cancel => "CANCEL",
        }
    }
}

impl std::fmt::Display for SalesOrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Transition<S: 'static, A: 'static> {
    pub from: S,
    pub action: A,
    pub to: S,
    pub roles: &'static [Role],
}

pub trait Workflow {
    type State: Copy + PartialEq + Display + 'static;
    type Action: Copy + PartialEq + Display + 'static;

    fn table() -> &'static [Transition<Self::State, Self::Action>];
}

/// Next state for `action` taken by `role` in state `from`.
pub fn transition<W: Workflow>(
    from: W::State,
    action: W::Action,
    role: Role,
) -> Result<W::State, EngineError> {
    let row = W::table()
        .iter()
        .find(|t| t.from == from && t.action == action)
        .ok_or_else(|| EngineError::TransitionNotAllowed {
            from: from.to_string(),
            action: action.to_string(),
        })?;

    if !row.roles.contains(&role) {
        return Err(EngineError::RoleNotPermitted {
            from: from.to_string(),
            action: action.to_string(),
            role: role.to_string(),
        });
    }
    Ok(row.to)
}

/// Actions `role` may take from `state`, in table order.
pub fn available_actions<W: Workflow>(state: W::State, role: Role) -> Vec<W::Action> {
    W::table()
        .iter()
        .filter(|t| t.from == state && t.roles.contains(&role))
        .map(|t| t.action)
        .collect()
}

const PO_EDITORS: &[Role] = &[Role::Admin, Role::Manager, Role::Purchase];
const PO_RECEIVERS: &[Role] = &[Role::Admin, Role::Manager, Role::Purchase, Role::Store];
const PO_ACCOUNTS: &[Role] = &[Role::Admin, Role::Manager, Role::Accounts];
const PO_CLOSERS: &[Role] = &[Role::Admin, Role::Manager];

pub struct PurchaseOrderWorkflow;

impl Workflow for PurchaseOrderWorkflow {
    type State = PurchaseOrderStatus;
    type Action = PurchaseOrderAction;

    fn table() -> &'static [Transition<PurchaseOrderStatus, PurchaseOrderAction>] {
        use PurchaseOrderAction as A;
        use PurchaseOrderStatus as S;

        const TABLE: &[Transition<PurchaseOrderStatus, PurchaseOrderAction>] = &[
            Transition {
                from: S::Draft,
                action: A::Edit,
                to: S::Draft,
                roles: PO_EDITORS,
            },
            Transition {
                from: S::Draft,
                action: A::Send,
                to: S::SentToSupplier,
                roles: PO_EDITORS,
            },
            Transition {
                from: S::SentToSupplier,
                action: A::Validate,
                to: S::ValidateGoods,
                roles: PO_RECEIVERS,
            },
            Transition {
                from: S::ValidateGoods,
                action: A::ReceivePart,
                to: S::GoodReceivedPart,
                roles: PO_RECEIVERS,
            },
            Transition {
                from: S::ValidateGoods,
                action: A::ReceiveFull,
                to: S::GoodReceivedFull,
                roles: PO_RECEIVERS,
            },
            Transition {
                from: S::GoodReceivedPart,
                action: A::Validate,
                to: S::ValidateGoods,
                roles: PO_RECEIVERS,
            },
            Transition {
                from: S::GoodReceivedPart,
                action: A::ReceiveFull,
                to: S::GoodReceivedFull,
                roles: PO_RECEIVERS,
            },
            Transition {
                from: S::GoodReceivedFull,
                action: A::Invoice,
                to: S::Invoiced,
                roles: PO_ACCOUNTS,
            },
            Transition {
                from: S::Invoiced,
                action: A::Close,
                to: S::Closed,
                roles: PO_CLOSERS,
            },
        ];
        TABLE
    }
}

const SO_EDITORS: &[Role] = &[Role::Admin, Role::Manager, Role::Sales];
const SO_CANCELLERS: &[Role] = &[Role::Admin, Role::Manager];

pub struct SalesOrderWorkflow;

impl Workflow for SalesOrderWorkflow {
    type State = SalesOrderStatus;
    type Action = SalesOrderAction;

    fn table() -> &'static [Transition<SalesOrderStatus, SalesOrderAction>] {
        const TABLE: &[Transition<SalesOrderStatus, SalesOrderAction>] = &[
            Transition {
                from: SalesOrderStatus::Confirmed,
                action: SalesOrderAction::Edit,
                to: SalesOrderStatus::Confirmed,
                roles: SO_EDITORS,
            },
            Transition {
                from: SalesOrderStatus::Confirmed,
                action: SalesOrderAction::Cancel,
                to: SalesOrderStatus::Cancelled,
                roles: SO_CANCELLERS,
            },
        ];
        TABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_order_happy_path() {
        use PurchaseOrderAction as A;
        let mut state = PurchaseOrderStatus::Draft;
        for action in [A::Send, A::Validate, A::ReceivePart, A::ReceiveFull, A::Invoice, A::Close] {
            state = transition::<PurchaseOrderWorkflow>(state, action, Role::Admin).unwrap();
        }
        assert_eq!(state, PurchaseOrderStatus::Closed);
    }

    #[test]
    fn unknown_pair_is_rejected() {
        let err = transition::<PurchaseOrderWorkflow>(
            PurchaseOrderStatus::Draft,
            PurchaseOrderAction::Invoice,
            Role::Admin,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Action INVOICE is not allowed when status is DRAFT"
        );
    }

    #[test]
    fn role_gates_transition() {
        let err = transition::<PurchaseOrderWorkflow>(
            PurchaseOrderStatus::GoodReceivedFull,
            PurchaseOrderAction::Invoice,
            Role::Store,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::RoleNotPermitted { .. }));

        assert_eq!(
            transition::<PurchaseOrderWorkflow>(
                PurchaseOrderStatus::GoodReceivedFull,
                PurchaseOrderAction::Invoice,
                Role::Accounts,
            )
            .unwrap(),
            PurchaseOrderStatus::Invoiced
        );
    }

    #[test]
    fn available_actions_follow_role() {
        assert_eq!(
            available_actions::<PurchaseOrderWorkflow>(
                PurchaseOrderStatus::ValidateGoods,
                Role::Store
            ),
            vec![PurchaseOrderAction::ReceivePart, PurchaseOrderAction::ReceiveFull]
        );
        assert!(
            available_actions::<PurchaseOrderWorkflow>(PurchaseOrderStatus::Closed, Role::Admin)
                .is_empty()
        );
        assert!(
            available_actions::<SalesOrderWorkflow>(SalesOrderStatus::Confirmed, Role::Viewer)
                .is_empty()
        );
    }

    #[test]
    fn cancelled_sales_order_is_terminal() {
        let next = transition::<SalesOrderWorkflow>(
            SalesOrderStatus::Confirmed,
            SalesOrderAction::Cancel,
            Role::Manager,
        )
        .unwrap();
        assert_eq!(next, SalesOrderStatus::Cancelled);
        assert!(available_actions::<SalesOrderWorkflow>(next, Role::Admin).is_empty());
    }

    #[test]
    fn role_names_parse_leniently() {
        assert_eq!(Role::from_string(" admin "), Role::Admin);
        assert_eq!(Role::from_string("intern"), Role::Viewer);
    }
}
