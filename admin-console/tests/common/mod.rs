use admin_console::config::{BackendSettings, SessionSettings};
use admin_console::services::backend_client::BackendClient;
use admin_console::startup::build_router;
use admin_console::AppState;
use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "test-token";

pub struct TestApp {
    pub address: String,
    pub backend: MockServer,
    pub client: reqwest::Client,
}

/// The backend's success envelope around `response_object`.
pub fn ok_envelope(response_object: Value) -> Value {
    json!({
        "status": true,
        "data": { "status": true, "responseObject": response_object }
    })
}

/// The backend's business-failure envelope.
pub fn rejected_envelope(message: &str) -> Value {
    json!({
        "status": true,
        "data": { "status": false, "responseObject": null, "message": message }
    })
}

impl TestApp {
    pub async fn spawn() -> Self {
        let backend = MockServer::start().await;

        let settings = BackendSettings {
            url: backend.uri(),
            timeout_seconds: Some(5),
        };
        let state = AppState::new(Arc::new(BackendClient::new(settings)));
        let app = build_router(state, &SessionSettings::default());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            address: format!("http://127.0.0.1:{}", port),
            backend,
            client,
        }
    }

    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.address, route)
    }

    /// Answer `operation` with a success envelope.
    pub async fn mock_operation(&self, operation: &str, response_object: Value) {
        Mock::given(method("POST"))
            .and(path(format!("/{}", operation)))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(response_object)))
            .mount(&self.backend)
            .await;
    }

    /// Answer `operation` with a business rejection.
    pub async fn mock_rejection(&self, operation: &str, message: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/{}", operation)))
            .respond_with(ResponseTemplate::new(200).set_body_json(rejected_envelope(message)))
            .mount(&self.backend)
            .await;
    }

    pub async fn post_login(&self, user_name: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/login"))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(format!("user_name={}&password={}", user_name, password))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in with the given role and return the session cookie.
    pub async fn login_as(&self, role: &str) -> String {
        self.mock_operation(
            "login",
            json!({
                "token": TEST_TOKEN,
                "userId": 7,
                "userName": "priya",
                "role": role,
            }),
        )
        .await;

        let response = self.post_login("priya", "secret").await;
        assert_eq!(response.status().as_u16(), 303);

        response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .expect("Login did not set a session cookie")
            .to_string()
    }

    pub async fn get(&self, route: &str, cookie: &str) -> reqwest::Response {
        self.client
            .get(self.url(route))
            .header(COOKIE, cookie)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, route: &str, cookie: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(route))
            .header(COOKIE, cookie)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Bodies the backend received for `operation`, in arrival order.
    pub async fn received(&self, operation: &str) -> Vec<Value> {
        let wanted = format!("/{}", operation);
        self.backend
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == wanted)
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }
}
