//! Client for the order backend's JSON API.
//!
//! Every operation is a POST to `{backend.url}/{operation}` wrapped in the
//! request envelope. No retries; a timeout applies only when configured.

use super::envelope::{open_envelope, DataAccess, EnvelopeFailure, RequestEnvelope};
use super::metrics::BACKEND_CALLS_TOTAL;
use super::session::BackendSession;
use crate::config::BackendSettings;
use async_trait::async_trait;
use order_engine::models::{
    AdjustmentDraft, AdjustmentKind, LineItem, Payment, Product, PurchaseOrderHeader,
    PurchaseOrderRecord, PurchaseOrderStatus, SalesOrderHeader, SalesOrderRecord,
    SalesOrderStatus, SerialOption, SerialStatus,
};
use order_engine::serials::SerialSource;
use order_engine::{EngineError, Role, Submission};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use service_core::error::AppError;
use service_core::observability::TracedClientExt;
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Business rejection; the message is shown to the user verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("Unexpected backend response: {0}")]
    Decode(String),

    #[error("Not logged in")]
    NotAuthenticated,
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Rejected(message) => AppError::BackendRejected(message),
            BackendError::NotAuthenticated => {
                AppError::Unauthorized(anyhow::anyhow!("Login required"))
            }
            other => AppError::BadGateway(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    user_id: i64,
    user_name: String,
    #[serde(default)]
    role: Option<String>,
}

/// A sales order together with the payments received against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderWithPayments {
    #[serde(flatten)]
    pub order: SalesOrderRecord,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

pub struct BackendClient {
    client: Client,
    settings: BackendSettings,
}

impl BackendClient {
    pub fn new(settings: BackendSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.settings.url
    }

    fn operation_url(&self, operation: &str) -> String {
        format!("{}/{}", self.settings.url.trim_end_matches('/'), operation)
    }

    /// Scope calls to a logged-in user and the current request.
    pub fn scoped<'a>(
        &'a self,
        session: &'a BackendSession,
        request_id: Option<&'a str>,
    ) -> ScopedBackend<'a> {
        ScopedBackend {
            client: self,
            session,
            request_id,
        }
    }

    #[instrument(skip_all, fields(operation = %operation))]
    async fn post<B: Serialize + ?Sized>(
        &self,
        operation: &str,
        body: &B,
        request_id: Option<&str>,
    ) -> Result<Value, BackendError> {
        let url = self.operation_url(operation);

        let mut request = self.client.traced_post(&url).json(body);
        if let Some(seconds) = self.settings.timeout_seconds {
            request = request.timeout(Duration::from_secs(seconds));
        }

        let result = self.exchange(request, request_id).await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(BackendError::Rejected(_)) => "rejected",
            Err(_) => "error",
        };
        BACKEND_CALLS_TOTAL
            .with_label_values(&[operation, outcome])
            .inc();

        match &result {
            Ok(_) => tracing::debug!("Backend operation succeeded"),
            Err(BackendError::Rejected(message)) => {
                tracing::warn!(message = %message, "Backend rejected operation")
            }
            Err(e) => tracing::error!(error = %e, url = %url, "Backend operation failed"),
        }
        result
    }

    async fn exchange(
        &self,
        request: service_core::observability::TracedRequest,
        request_id: Option<&str>,
    ) -> Result<Value, BackendError> {
        let response = request.send_with_request_id(request_id).await?;
        let status = response.status();
        let body = response.text().await?;

        // Business failures may arrive with a non-2xx status; prefer the
        // envelope's message when there is one.
        match open_envelope(&body) {
            Ok(value) if status.is_success() => Ok(value),
            Ok(_) => Err(BackendError::Status {
                status: status.as_u16(),
                body,
            }),
            Err(EnvelopeFailure::Rejected(message)) => Err(BackendError::Rejected(message)),
            Err(EnvelopeFailure::Malformed(_)) if !status.is_success() => {
                Err(BackendError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
            Err(EnvelopeFailure::Malformed(reason)) => Err(BackendError::Decode(reason)),
        }
    }

    /// Exchange credentials for a session token.
    pub async fn login(
        &self,
        user_name: &str,
        password: &Secret<String>,
        request_id: Option<&str>,
    ) -> Result<BackendSession, BackendError> {
        let body = json!({
            "userName": user_name,
            "password": password.expose_secret(),
        });
        let value = self.post("login", &body, request_id).await?;
        let login: LoginResponse = decode(value)?;

        Ok(BackendSession {
            token: login.token,
            user_id: login.user_id,
            user_name: login.user_name,
            role: login
                .role
                .as_deref()
                .map(Role::from_string)
                .unwrap_or(Role::Viewer),
        })
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, BackendError> {
    serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Backend calls made on behalf of one user within one request.
#[derive(Clone, Copy)]
pub struct ScopedBackend<'a> {
    client: &'a BackendClient,
    session: &'a BackendSession,
    request_id: Option<&'a str>,
}

impl<'a> ScopedBackend<'a> {
    async fn call<B, R>(&self, operation: &str, body: &B) -> Result<R, BackendError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let envelope = RequestEnvelope {
            token: &self.session.token,
            data_access: DataAccess {
                user_id: self.session.user_id,
                user_name: &self.session.user_name,
            },
            body,
        };
        let value = self
            .client
            .post(operation, &envelope, self.request_id)
            .await?;
        decode(value)
    }

    /// Calls whose `responseObject` carries nothing of interest.
    async fn call_unit<B: Serialize>(&self, operation: &str, body: &B) -> Result<(), BackendError> {
        self.call::<B, Value>(operation, body).await.map(|_| ())
    }

    /// Lists come back as `null` when empty.
    async fn call_list<B, R>(&self, operation: &str, body: &B) -> Result<Vec<R>, BackendError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let value: Option<Vec<R>> = self.call(operation, body).await?;
        Ok(value.unwrap_or_default())
    }

    pub async fn logout(&self) -> Result<(), BackendError> {
        self.call_unit("logout", &json!({})).await
    }

    // Sales orders

    pub async fn list_sales_orders(&self) -> Result<Vec<SalesOrderRecord>, BackendError> {
        self.call_list("listAllSalesOrders", &json!({})).await
    }

    pub async fn sales_order(
        &self,
        sales_order_id: i64,
    ) -> Result<Option<SalesOrderRecord>, BackendError> {
        Ok(self
            .list_sales_orders()
            .await?
            .into_iter()
            .find(|o| o.header.sales_order_id == Some(sales_order_id)))
    }

    pub async fn save_sales_order(
        &self,
        submission: &Submission<SalesOrderHeader>,
    ) -> Result<Value, BackendError> {
        self.call("saveOrUpdateSalesOrder", submission).await
    }

    pub async fn sales_order_items(
        &self,
        sales_order_id: i64,
    ) -> Result<Vec<LineItem>, BackendError> {
        self.call_list("getSalesOrderItems", &json!({ "salesOrderId": sales_order_id }))
            .await
    }

    pub async fn update_sales_order_status(
        &self,
        sales_order_id: i64,
        status: SalesOrderStatus,
    ) -> Result<(), BackendError> {
        self.call_unit(
            "updateSalesOrderStatus",
            &json!({ "salesOrderId": sales_order_id, "status": status }),
        )
        .await
    }

    pub async fn cancel_sales_order(&self, sales_order_id: i64) -> Result<(), BackendError> {
        self.call_unit("cancelSalesOrder", &json!({ "salesOrderId": sales_order_id }))
            .await
    }

    pub async fn sales_orders_with_payments(
        &self,
    ) -> Result<Vec<SalesOrderWithPayments>, BackendError> {
        self.call_list("getSalesOrdersWithPayments", &json!({})).await
    }

    pub async fn saleable_items(
        &self,
        location_id: Option<i64>,
    ) -> Result<Vec<Product>, BackendError> {
        self.call_list(
            "listAllAvailableSalebleItems",
            &json!({ "locationId": location_id }),
        )
        .await
    }

    // Payments

    pub async fn save_payment(&self, payment: &Payment) -> Result<Value, BackendError> {
        self.call("saveOrUpdateOrderPayment", payment).await
    }

    pub async fn payments_for_order(
        &self,
        sales_order_id: i64,
    ) -> Result<Vec<Payment>, BackendError> {
        self.call_list(
            "getPaymentsBySalesOrderId",
            &json!({ "salesOrderId": sales_order_id }),
        )
        .await
    }

    pub async fn delete_payment(&self, payment_id: i64) -> Result<(), BackendError> {
        self.call_unit("deletePayment", &json!({ "paymentId": payment_id }))
            .await
    }

    // Purchase orders

    pub async fn list_purchase_orders(&self) -> Result<Vec<PurchaseOrderRecord>, BackendError> {
        self.call_list("listAllPurchaseOrders", &json!({})).await
    }

    pub async fn purchase_order(
        &self,
        purchase_order_id: i64,
    ) -> Result<Option<PurchaseOrderRecord>, BackendError> {
        Ok(self
            .list_purchase_orders()
            .await?
            .into_iter()
            .find(|o| o.header.purchase_order_id == Some(purchase_order_id)))
    }

    pub async fn save_purchase_order(
        &self,
        submission: &Submission<PurchaseOrderHeader>,
    ) -> Result<Value, BackendError> {
        self.call("saveOrUpdatePurchaseOrder", submission).await
    }

    pub async fn purchase_order_items(
        &self,
        purchase_order_id: i64,
    ) -> Result<Vec<LineItem>, BackendError> {
        self.call_list(
            "getPurchaseOrderItems",
            &json!({ "purchaseOrderId": purchase_order_id }),
        )
        .await
    }

    pub async fn update_purchase_order_status(
        &self,
        purchase_order_id: i64,
        status: PurchaseOrderStatus,
    ) -> Result<(), BackendError> {
        self.call_unit(
            "updatePurchaseOrderStatus",
            &json!({ "purchaseOrderId": purchase_order_id, "status": status }),
        )
        .await
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        self.call_list("listAllProducts", &json!({})).await
    }

    // Inventory

    pub async fn serial_numbers(
        &self,
        product_id: i64,
        status: SerialStatus,
    ) -> Result<Vec<SerialOption>, BackendError> {
        self.call_list(
            "getSerialNumbersByStatus",
            &json!({ "productId": product_id, "status": status }),
        )
        .await
    }

    pub async fn save_adjustment(&self, draft: &AdjustmentDraft) -> Result<Value, BackendError> {
        let operation = match draft.kind {
            AdjustmentKind::Adjustment => "saveInventoryAdjustment",
            AdjustmentKind::Move => "saveInventoryMove",
            AdjustmentKind::Issue => "saveInventoryIssue",
        };
        self.call(operation, &draft.for_submission()).await
    }
}

#[async_trait]
impl SerialSource for ScopedBackend<'_> {
    async fn serials_by_status(
        &self,
        product_id: i64,
        status: SerialStatus,
    ) -> Result<Vec<SerialOption>, EngineError> {
        self.serial_numbers(product_id, status)
            .await
            .map_err(|e| EngineError::SerialSource(e.to_string()))
    }
}
