mod common;

use common::TestApp;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn controller_row(quantity: u32) -> Value {
    json!({
        "productId": 1,
        "productName": "Controller",
        "quantity": quantity,
        "unitPrice": 1000,
        "discountPercent": 10,
        "gstPercentage": 18,
        "cgstPercent": 9,
        "sgstPercent": 9,
        "discountAmount": 100 * quantity,
        "cgstAmount": 81 * quantity,
        "sgstAmount": 81 * quantity,
        "totalAmount": 1062 * quantity
    })
}

fn draft(items: Vec<Value>) -> Value {
    json!({
        "customerName": "Acme Motors",
        "billingAddress": "12 MG Road, Bengaluru",
        "billingStateCode": "29",
        "deliveryStateCode": "29",
        "items": items
    })
}

fn stored_order(id: i64, status: &str, grand_total: u32) -> Value {
    json!({
        "salesOrderId": id,
        "orderNo": format!("SO-{}", id),
        "customerName": "Acme Motors",
        "status": status,
        "taxType": "INTRA",
        "grandTotal": grand_total
    })
}

#[tokio::test]
async fn recompute_fills_row_from_catalog() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("SALES").await;
    app.mock_operation(
        "listAllAvailableSalebleItems",
        json!([{
            "productId": 1,
            "productName": "Controller",
            "unitPrice": 1000,
            "gstPercentage": 18,
            "availableQuantity": 4
        }]),
    )
    .await;

    let response = app
        .post_json(
            "/api/line-items/recompute",
            &cookie,
            &json!({
                "orderKind": "SALES",
                "item": {},
                "change": { "field": "productId", "value": 1 },
                "taxType": "INTRA",
                "locationId": 3
            }),
        )
        .await;

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    let item = body["data"].clone();
    assert_eq!(item["productName"], "Controller");
    assert_eq!(item["availableQuantity"], 4.0);
    assert_eq!(item["cgstPercent"], 9.0);
    assert_eq!(item["igstPercent"], 0.0);
    assert_eq!(item["quantity"], 0.0);
    assert!(body["notices"].as_array().unwrap().is_empty());

    let response = app
        .post_json(
            "/api/line-items/recompute",
            &cookie,
            &json!({
                "orderKind": "SALES",
                "item": item,
                "change": { "field": "quantity", "value": 2 },
                "taxType": "INTRA",
                "locationId": 3
            }),
        )
        .await;

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["totalAmount"], 2360.0);
    assert_eq!(body["data"]["cgstAmount"], 180.0);
}

#[tokio::test]
async fn serialized_sale_loads_candidates_at_location() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("SALES").await;
    app.mock_operation(
        "getSerialNumbersByStatus",
        json!([
            { "serialNo": "B-1", "productId": 5, "locationId": 3, "status": "in_stock" },
            { "serialNo": "B-2", "productId": 5, "locationId": 9, "status": "in_stock" }
        ]),
    )
    .await;

    let response = app
        .post_json(
            "/api/line-items/recompute",
            &cookie,
            &json!({
                "orderKind": "SALES",
                "item": {
                    "productId": 5,
                    "productName": "Battery Pack",
                    "unitPrice": 500,
                    "serialNoApplicable": true,
                    "serialNumbers": ["B-2"]
                },
                "change": { "field": "quantity", "value": 1 },
                "locationId": 3
            }),
        )
        .await;

    let body: Value = response.json().await.unwrap();
    let options = body["data"]["serialOptions"].as_array().unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0]["serialNo"], "B-1");
    // B-2 sits at another location and is dropped from the selection.
    assert!(body["data"]["serialNumbers"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn totals_round_to_whole_units() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("SALES").await;

    let response = app
        .post_json(
            "/api/orders/totals",
            &cookie,
            &json!({ "items": [{ "quantity": 1, "unitPrice": 100.4, "totalAmount": 100.4 }] }),
        )
        .await;

    let totals: Value = response.json().await.unwrap();
    assert_eq!(totals["grandTotal"], 100.4);
    assert_eq!(totals["roundedGrandTotal"], 100.0);
}

#[tokio::test]
async fn totals_ignore_amounts_sent_by_the_browser() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("SALES").await;
    let mut row = controller_row(2);
    row["discountAmount"] = json!(0);
    row["totalAmount"] = json!(5);

    let response = app
        .post_json("/api/orders/totals", &cookie, &json!({ "items": [row] }))
        .await;

    let totals: Value = response.json().await.unwrap();
    assert_eq!(totals["discountAmount"], 200.0);
    assert_eq!(totals["grandTotal"], 2124.0);
}

#[tokio::test]
async fn oversized_amounts_are_rejected() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("SALES").await;

    let response = app
        .post_json(
            "/api/line-items/recompute",
            &cookie,
            &json!({
                "orderKind": "SALES",
                "item": { "productId": 1, "quantity": 1_000_000_000_000_000u64 },
                "change": { "field": "unitPrice", "value": 1_000_000_000_000_000u64 },
                "taxType": "INTRA"
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Amount is too large to calculate");

    let response = app
        .post_json(
            "/api/orders/totals",
            &cookie,
            &json!({ "items": [{
                "quantity": 1_000_000_000_000_000u64,
                "unitPrice": 1_000_000_000_000_000u64
            }] }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn invalid_order_never_reaches_backend() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("SALES").await;
    Mock::given(method("POST"))
        .and(path("/saveOrUpdateSalesOrder"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.backend)
        .await;

    let mut serialized = controller_row(2);
    serialized["serialNoApplicable"] = json!(true);
    serialized["serialNumbers"] = json!(["S-1"]);

    let response = app
        .post_json("/api/sales-orders", &cookie, &draft(vec![serialized]))
        .await;

    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Row 1 (Controller): select exactly 2 serial numbers"));
}

#[tokio::test]
async fn valid_order_is_submitted_with_unrounded_totals() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("SALES").await;
    app.mock_operation("saveOrUpdateSalesOrder", json!({ "salesOrderId": 41 }))
        .await;

    let response = app
        .post_json("/api/sales-orders", &cookie, &draft(vec![controller_row(2)]))
        .await;

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["result"]["salesOrderId"], 41);
    assert_eq!(body["notices"][0]["severity"], "success");

    let saved = app.received("saveOrUpdateSalesOrder").await;
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0]["customerName"], "Acme Motors");
    assert_eq!(saved[0]["status"], "CONFIRMED");
    assert_eq!(saved[0]["grandTotal"], 2124.0);
    assert!(saved[0].get("roundedGrandTotal").is_none());
    assert_eq!(saved[0]["items"].as_array().unwrap().len(), 1);
    assert_eq!(saved[0]["token"], common::TEST_TOKEN);
}

#[tokio::test]
async fn stale_row_amounts_are_recomputed_before_saving() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("SALES").await;
    app.mock_operation("saveOrUpdateSalesOrder", json!({ "salesOrderId": 42 }))
        .await;

    let mut row = controller_row(2);
    row["discountAmount"] = json!(0);
    row["cgstAmount"] = json!(1);
    row["sgstAmount"] = json!(1);
    row["totalAmount"] = json!(5);

    let response = app
        .post_json("/api/sales-orders", &cookie, &draft(vec![row]))
        .await;
    assert!(response.status().is_success());

    let saved = app.received("saveOrUpdateSalesOrder").await;
    let item = &saved[0]["items"][0];
    assert_eq!(item["discountAmount"], 200.0);
    assert_eq!(item["cgstAmount"], 162.0);
    assert_eq!(item["sgstAmount"], 162.0);
    assert_eq!(item["totalAmount"], 2124.0);
    assert_eq!(saved[0]["grandTotal"], 2124.0);
    assert_eq!(saved[0]["discountAmount"], 200.0);
}

#[tokio::test]
async fn backend_rejection_is_shown_verbatim() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("SALES").await;
    app.mock_rejection("saveOrUpdateSalesOrder", "Serial S-9 is already sold")
        .await;

    let response = app
        .post_json("/api/sales-orders", &cookie, &draft(vec![controller_row(1)]))
        .await;

    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Serial S-9 is already sold");
}

#[tokio::test]
async fn viewers_cannot_save_orders() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("VIEWER").await;

    let response = app
        .post_json("/api/sales-orders", &cookie, &draft(vec![controller_row(1)]))
        .await;

    assert_eq!(response.status().as_u16(), 403);
    assert!(app.received("saveOrUpdateSalesOrder").await.is_empty());
}

#[tokio::test]
async fn cancel_is_limited_to_confirmed_orders() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("MANAGER").await;
    app.mock_operation(
        "listAllSalesOrders",
        json!([stored_order(1, "CONFIRMED", 1000), stored_order(2, "CANCELLED", 500)]),
    )
    .await;
    app.mock_operation("cancelSalesOrder", json!(null)).await;

    let response = app
        .post_json("/api/sales-orders/1/cancel", &cookie, &json!({}))
        .await;
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "CANCELLED");

    let response = app
        .post_json("/api/sales-orders/2/cancel", &cookie, &json!({}))
        .await;
    assert_eq!(response.status().as_u16(), 422);
    assert_eq!(app.received("cancelSalesOrder").await.len(), 1);
}

#[tokio::test]
async fn overpayment_is_rejected() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("ACCOUNTS").await;
    app.mock_operation(
        "listAllSalesOrders",
        json!([stored_order(1, "CONFIRMED", 1000)]),
    )
    .await;
    app.mock_operation(
        "getPaymentsBySalesOrderId",
        json!([{ "paymentId": 10, "salesOrderId": 1, "amount": 600, "paymentMode": "CASH" }]),
    )
    .await;

    let response = app
        .post_json(
            "/api/sales-orders/1/payments",
            &cookie,
            &json!({ "amount": 500, "paymentMode": "UPI" }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Payment of 500.00 exceeds the outstanding balance of 400.00"
    );
    assert!(app.received("saveOrUpdateOrderPayment").await.is_empty());
}

#[tokio::test]
async fn export_downloads_csv() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("ADMIN").await;
    app.mock_operation(
        "listAllSalesOrders",
        json!([stored_order(1, "CONFIRMED", 1000)]),
    )
    .await;

    let response = app.get("/api/sales-orders/export", &cookie).await;

    assert!(response.status().is_success());
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/csv; charset=utf-8"
    );
    let csv = response.text().await.unwrap();
    assert!(csv.contains("SO-1"));
    assert!(csv.contains("Acme Motors"));
}
