//! `GET /api/places?department=&lat=&lng=`: hospitals near the guardian.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::places::{Coordinate, PlaceRecord, DEFAULT_COORDINATE};

#[derive(Deserialize)]
pub struct PlacesQuery {
    pub department: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Missing coordinates fall back to the default map center.
pub async fn nearby(
    State(ctx): State<ApiContext>,
    Query(query): Query<PlacesQuery>,
) -> Result<Json<Vec<PlaceRecord>>, ApiError> {
    let places = ctx
        .core
        .places()
        .ok_or_else(|| ApiError::Unavailable("Places lookup is not configured".into()))?;

    let center = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => Coordinate { lat, lng },
        _ => DEFAULT_COORDINATE,
    };
    Ok(Json(places.nearby(&query.department, center).await?))
}
