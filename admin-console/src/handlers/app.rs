use crate::services::session::SessionUser;
use askama::Template;
use axum::response::IntoResponse;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub user_name: String,
    pub role: String,
}

pub async fn index(user: SessionUser) -> impl IntoResponse {
    IndexTemplate {
        user_name: user.backend.user_name.clone(),
        role: user.role().to_string(),
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}
