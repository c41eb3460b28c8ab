use crate::services::backend_client::BackendError;
use crate::services::session::{BackendSession, SESSION_KEY};
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::middleware::RequestId;
use tower_sessions::Session;
use validator::Validate;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Enter your user name"))]
    pub user_name: String,
    #[validate(custom(function = "non_empty_secret"))]
    pub password: Secret<String>,
}

fn non_empty_secret(secret: &Secret<String>) -> Result<(), validator::ValidationError> {
    if secret.expose_secret().is_empty() {
        let mut err = validator::ValidationError::new("required");
        err.message = Some("Enter your password".into());
        return Err(err);
    }
    Ok(())
}

fn login_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        LoginTemplate {
            error: Some(message.into()),
        },
    )
        .into_response()
}

pub async fn login_page() -> impl IntoResponse {
    LoginTemplate { error: None }
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    request_id: RequestId,
    Form(form): Form<LoginForm>,
) -> Response {
    if let Err(errors) = form.validate() {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Enter user name and password".to_string());
        return login_error(StatusCode::UNPROCESSABLE_ENTITY, message);
    }

    match state
        .backend
        .login(&form.user_name, &form.password, Some(request_id.as_str()))
        .await
    {
        Ok(backend_session) => {
            if let Err(e) = session.cycle_id().await {
                tracing::warn!("Failed to rotate session id: {}", e);
            }
            if let Err(e) = session.insert(SESSION_KEY, &backend_session).await {
                tracing::error!("Failed to store session: {}", e);
                return login_error(StatusCode::INTERNAL_SERVER_ERROR, "Could not start a session");
            }

            tracing::info!(
                user_id = backend_session.user_id,
                user_name = %backend_session.user_name,
                role = %backend_session.role,
                "User logged in"
            );
            Redirect::to("/").into_response()
        }
        Err(BackendError::Rejected(message)) => {
            login_error(StatusCode::UNPROCESSABLE_ENTITY, message)
        }
        Err(e) => {
            tracing::error!("Login call failed: {}", e);
            login_error(StatusCode::BAD_GATEWAY, "Login service is unavailable")
        }
    }
}

/// Always ends the local session, even when the backend logout fails.
pub async fn logout_handler(
    State(state): State<AppState>,
    session: Session,
    request_id: RequestId,
) -> impl IntoResponse {
    let backend_session: Option<BackendSession> = session.get(SESSION_KEY).await.unwrap_or(None);

    if let Some(backend_session) = backend_session {
        match state
            .backend
            .scoped(&backend_session, Some(request_id.as_str()))
            .logout()
            .await
        {
            Ok(()) => tracing::info!(user_id = backend_session.user_id, "User logged out"),
            Err(e) => tracing::warn!(
                user_id = backend_session.user_id,
                "Backend logout failed, clearing session anyway: {}",
                e
            ),
        }
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to clear session: {}", e);
    }

    Redirect::to("/login")
}
