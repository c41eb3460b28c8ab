mod common;

use common::{TestApp, TEST_TOKEN};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn login_stores_session_and_sends_credentials() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("SALES").await;

    let logins = app.received("login").await;
    assert_eq!(logins.len(), 1);
    assert_eq!(logins[0]["userName"], "priya");
    assert_eq!(logins[0]["password"], "secret");

    let response = app.get("/", &cookie).await;
    assert!(response.status().is_success());
    let page = response.text().await.unwrap();
    assert!(page.contains("priya"));
    assert!(page.contains("SALES"));
}

#[tokio::test]
async fn scoped_calls_carry_token_and_user() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("ADMIN").await;
    app.mock_operation("listAllSalesOrders", json!(null)).await;

    let response = app.get("/api/sales-orders", &cookie).await;
    assert!(response.status().is_success());
    let rows: Vec<serde_json::Value> = response.json().await.unwrap();
    assert!(rows.is_empty());

    let calls = app.received("listAllSalesOrders").await;
    assert_eq!(calls[0]["token"], TEST_TOKEN);
    assert_eq!(calls[0]["dataAccessDTO"]["userId"], 7);
    assert_eq!(calls[0]["dataAccessDTO"]["userName"], "priya");
}

#[tokio::test]
async fn rejected_login_shows_backend_message() {
    let app = TestApp::spawn().await;
    app.mock_rejection("login", "Invalid user name or password")
        .await;

    let response = app.post_login("priya", "wrong").await;

    assert_eq!(response.status().as_u16(), 422);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("Invalid user name or password"));
}

#[tokio::test]
async fn empty_password_never_reaches_backend() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.backend)
        .await;

    let response = app.post_login("priya", "").await;

    assert_eq!(response.status().as_u16(), 422);
    assert!(response.text().await.unwrap().contains("Enter your password"));
}

#[tokio::test]
async fn logout_clears_session_even_when_backend_fails() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("ADMIN").await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.backend)
        .await;

    let response = app
        .client
        .post(app.url("/logout"))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(response.headers().get("location").unwrap(), "/login");

    let response = app.get("/api/sales-orders", &cookie).await;
    assert_eq!(response.status().as_u16(), 401);
}
