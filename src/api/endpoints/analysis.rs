//! `POST /api/sessions/:id/analyze`: run the department recommendation.

use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{parse_session_id, ApiContext};
use crate::models::DiagnosisResult;

/// Provider failures never surface here: they degrade to the fallback
/// result. A reset during the call yields 409.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<DiagnosisResult>, ApiError> {
    let id = parse_session_id(&id)?;
    match ctx.core.analyze(id).await? {
        Some(result) => Ok(Json(result)),
        None => Err(ApiError::Conflict(
            "Session was reset while the analysis was running".into(),
        )),
    }
}
