mod common;

use common::TestApp;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/health"))
        .header("x-request-id", "req-123")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-123");
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
}

#[tokio::test]
async fn api_without_session_is_unauthorized() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/api/sales-orders"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Login required");
}

#[tokio::test]
async fn pages_without_session_redirect_to_login() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.url("/")).send().await.unwrap();

    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(response.headers().get("location").unwrap(), "/login");
}

#[tokio::test]
async fn metrics_are_exposed() {
    let app = TestApp::spawn().await;
    app.client.get(app.url("/health")).send().await.unwrap();

    let response = app.client.get(app.url("/metrics")).send().await.unwrap();

    assert!(response.status().is_success());
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("console_http_requests_total"));
}
