use super::{validation_error, WithNotices};
use crate::services::session::SessionUser;
use crate::AppState;
use axum::{extract::State, Json};
use order_engine::adjustments::validate_adjustment;
use order_engine::models::AdjustmentDraft;
use order_engine::{Notice, NoticeBuffer, Notifier};
use serde_json::Value;
use service_core::error::AppError;
use service_core::middleware::RequestId;

/// Save an adjustment, move or issue once its rows pass validation.
pub async fn save_adjustment(
    State(state): State<AppState>,
    user: SessionUser,
    request_id: RequestId,
    Json(draft): Json<AdjustmentDraft>,
) -> Result<Json<WithNotices<Value>>, AppError> {
    if let Err(e) = validate_adjustment(&draft) {
        tracing::info!(kind = %draft.kind, rule = ?e.rule, "Inventory draft rejected by validation");
        return Err(validation_error(e));
    }

    let backend = state.backend.scoped(&user.backend, Some(request_id.as_str()));
    let result = backend.save_adjustment(&draft).await?;
    tracing::info!(
        kind = %draft.kind,
        location_id = ?draft.location_id,
        rows = draft.rows.len(),
        "Inventory draft saved"
    );

    let notices = NoticeBuffer::new();
    notices.notify(Notice::success(format!("Inventory {} saved", draft.kind)));
    Ok(Json(WithNotices {
        data: result,
        notices: notices.drain(),
    }))
}
