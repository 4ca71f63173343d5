//! Catalog endpoints for the first two screens.
//!
//! - `GET /api/catalog?category=&q=`: symptom picker tabs
//! - `GET /api/ages`: age buckets

use axum::extract::Query;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{parse_category, AgeBucketView};
use crate::catalog::{self, CategoryView};
use crate::intake::AGE_BUCKETS;

#[derive(Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

/// `GET /api/catalog`: categories with their symptoms, optionally filtered.
pub async fn list(Query(query): Query<CatalogQuery>) -> Result<Json<Vec<CategoryView>>, ApiError> {
    let category = query
        .category
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(parse_category)
        .transpose()?;
    let term = query.q.unwrap_or_default();
    Ok(Json(catalog::search(&term, category)))
}

/// `GET /api/ages`: selectable age buckets, youngest first.
pub async fn ages() -> Json<Vec<AgeBucketView>> {
    Json(AGE_BUCKETS.iter().map(AgeBucketView::from).collect())
}
