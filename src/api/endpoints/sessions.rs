//! Session lifecycle and age selection.
//!
//! - `POST /api/sessions`: open a session
//! - `GET /api/sessions/:id`: snapshot
//! - `DELETE /api/sessions/:id`: close
//! - `PUT /api/sessions/:id/age`: choose a bucket or type an age
//! - `POST /api/sessions/:id/reset`: back to the first screen

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{parse_session_id, AgeSelection, ApiContext, SessionCreated};
use crate::intake::SessionSnapshot;

/// `POST /api/sessions`
pub async fn create(
    State(ctx): State<ApiContext>,
) -> Result<(StatusCode, Json<SessionCreated>), ApiError> {
    let session_id = ctx.core.create_session()?;
    Ok((StatusCode::CREATED, Json(SessionCreated { session_id })))
}

/// `GET /api/sessions/:id`
pub async fn snapshot(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let id = parse_session_id(&id)?;
    Ok(Json(ctx.core.with_session(id, |s| s.snapshot())?))
}

/// `DELETE /api/sessions/:id`
pub async fn close(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_session_id(&id)?;
    if ctx.core.remove_session(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("session {id}")))
    }
}

/// `PUT /api/sessions/:id/age`
///
/// An invalid typed age is rejected and the previous age is kept.
pub async fn set_age(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(selection): Json<AgeSelection>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let id = parse_session_id(&id)?;
    let snapshot = ctx.core.with_session(id, |s| {
        let selected = match &selection {
            AgeSelection::Bucket { bucket } => s.select_bucket(bucket).map(|_| ()),
            AgeSelection::Exact { exact } => s.select_exact(exact).map(|_| ()),
        };
        selected.map(|()| s.snapshot())
    })??;
    Ok(Json(snapshot))
}

/// `POST /api/sessions/:id/reset`
pub async fn reset(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let id = parse_session_id(&id)?;
    let snapshot = ctx.core.with_session(id, |s| {
        s.reset();
        s.snapshot()
    })?;
    tracing::info!(session_id = %id, "Session reset");
    Ok(Json(snapshot))
}
