//! Shared types for the HTTP API layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::core_state::CoreState;
use crate::intake::AgeBucket;
use crate::models::SymptomCategory;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Parse a session id path segment.
pub fn parse_session_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid session id: {raw}")))
}

pub fn parse_category(raw: &str) -> Result<SymptomCategory, ApiError> {
    raw.trim()
        .parse()
        .map_err(|e: crate::models::ModelError| ApiError::BadRequest(e.to_string()))
}

// ═══════════════════════════════════════════════════════════
// Request bodies
// ═══════════════════════════════════════════════════════════

/// `PUT /api/sessions/:id/age`: either a bucket label or a typed age.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AgeSelection {
    Bucket { bucket: String },
    Exact { exact: String },
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub key: String,
    pub category: String,
}

// ═══════════════════════════════════════════════════════════
// Response bodies
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBucketView {
    pub min: u8,
    pub max: u8,
    pub label: &'static str,
    pub icon: &'static str,
    pub range_text: String,
}

impl From<&AgeBucket> for AgeBucketView {
    fn from(bucket: &AgeBucket) -> Self {
        Self {
            min: bucket.min,
            max: bucket.max,
            label: bucket.label,
            icon: bucket.icon,
            range_text: bucket.range_text(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub key: String,
    pub selected: bool,
    pub selected_count: usize,
}
