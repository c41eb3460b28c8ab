//! The logged-in user, kept in the server-side session.

use axum::{
    async_trait,
    extract::{FromRequestParts, OriginalUri},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use order_engine::Role;
use serde::{Deserialize, Serialize};
use service_core::error::ErrorResponse;
use tower_sessions::Session;

pub const SESSION_KEY: &str = "backend_session";

/// Token and user details returned by the backend `login` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendSession {
    pub token: String,
    pub user_id: i64,
    pub user_name: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Viewer
}

/// Extractor for handlers that need a logged-in user.
///
/// Pages redirect to `/login`; `/api/` routes answer 401 instead.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub backend: BackendSession,
    pub session: Session,
}

impl SessionUser {
    pub fn role(&self) -> Role {
        self.backend.role
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract session",
                )
                    .into_response()
            })?;

        let backend: Option<BackendSession> = session.get(SESSION_KEY).await.unwrap_or(None);

        // Nested routers see a stripped path.
        let is_api_route = parts
            .extensions
            .get::<OriginalUri>()
            .map_or(&parts.uri, |original| &original.0)
            .path()
            .starts_with("/api/");

        match backend {
            Some(backend) => Ok(SessionUser { backend, session }),
            None if is_api_route => Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Login required".to_string(),
                    details: None,
                }),
            )
                .into_response()),
            None => Err(Redirect::to("/login").into_response()),
        }
    }
}
