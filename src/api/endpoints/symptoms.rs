//! Symptom selection endpoints.
//!
//! - `POST /api/sessions/:id/symptoms/toggle`: add or remove a catalog symptom
//! - `POST /api/sessions/:id/symptoms/custom`: add a free-text symptom
//! - `DELETE /api/sessions/:id/symptoms/:key`: remove by key

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{parse_category, parse_session_id, ApiContext, ToggleRequest, ToggleResponse};
use crate::intake::{CustomSymptomInput, Toggle};
use crate::models::SymptomDescriptor;

/// `POST /api/sessions/:id/symptoms/toggle`
pub async fn toggle(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let id = parse_session_id(&id)?;
    let category = parse_category(&request.category)?;

    let (toggled, selected_count) = ctx.core.with_session(id, |s| {
        let toggled = s.toggle_symptom(&request.key, category)?;
        Ok::<_, ApiError>((toggled, s.selection().len()))
    })??;

    Ok(Json(ToggleResponse {
        key: request.key,
        selected: toggled == Toggle::Added,
        selected_count,
    }))
}

/// `POST /api/sessions/:id/symptoms/custom`
pub async fn add_custom(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(input): Json<CustomSymptomInput>,
) -> Result<(StatusCode, Json<SymptomDescriptor>), ApiError> {
    let id = parse_session_id(&id)?;
    let symptom = ctx.core.with_session(id, |s| s.add_custom(input))??;
    tracing::debug!(session_id = %id, key = %symptom.key, "Custom symptom added");
    Ok((StatusCode::CREATED, Json(symptom)))
}

/// `DELETE /api/sessions/:id/symptoms/:key`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path((id, key)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let id = parse_session_id(&id)?;
    if ctx.core.with_session(id, |s| s.remove_symptom(&key))? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("symptom {key}")))
    }
}
