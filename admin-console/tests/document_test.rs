mod common;

use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn sales_invoice_renders_intra_columns_and_words() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("SALES").await;
    app.mock_operation(
        "listAllSalesOrders",
        json!([{
            "salesOrderId": 4,
            "orderNo": "SO-4",
            "orderDate": "2026-03-05",
            "customerName": "Acme Motors",
            "customerGstin": "29ABCDE1234F1Z5",
            "billingStateCode": "29",
            "deliveryStateCode": "29",
            "taxType": "INTRA",
            "status": "CONFIRMED"
        }]),
    )
    .await;
    app.mock_operation(
        "getSalesOrderItems",
        json!([{
            "productId": 1,
            "productName": "Scooter X1",
            "quantity": 1,
            "unitPrice": 1000,
            "cgstPercent": 9,
            "sgstPercent": 9,
            "cgstAmount": 90,
            "sgstAmount": 90,
            "totalAmount": 1180,
            "isFinalVeichle": true,
            "chassisNo": "CH-77"
        }]),
    )
    .await;

    let response = app.get("/sales-orders/4/invoice", &cookie).await;

    assert!(response.status().is_success());
    let page = response.text().await.unwrap();
    assert!(page.contains("SO-4"));
    assert!(page.contains("05-03-2026"));
    assert!(page.contains("CGST"));
    assert!(!page.contains("IGST"));
    assert!(page.contains("Chassis: CH-77"));
    assert!(page.contains("One Thousand One Hundred Eighty"));
}

#[tokio::test]
async fn missing_order_is_not_found() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("SALES").await;
    app.mock_operation("listAllPurchaseOrders", json!([])).await;

    let response = app.get("/purchase-orders/99/document", &cookie).await;

    assert_eq!(response.status().as_u16(), 404);
}
