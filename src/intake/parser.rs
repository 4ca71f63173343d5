use serde::Deserialize;

use super::provider::{ProviderError, ProviderOutcome};
use super::IntakeError;
use crate::models::DiagnosisResult;

pub const MIN_URGENCY: u8 = 1;
pub const MAX_URGENCY: u8 = 5;

/// Parse the provider's raw text into a [`DiagnosisResult`].
///
/// Accepts a bare JSON object, a fenced ```json block, or an object
/// embedded in surrounding prose.
pub fn parse_diagnosis_response(response: &str) -> Result<DiagnosisResult, IntakeError> {
    let json_str = extract_json_object(response)?;
    parse_diagnosis_json(json_str)
}

/// Map one raw provider attempt to its outcome.
pub fn classify_response(response: Result<String, ProviderError>) -> ProviderOutcome {
    match response {
        Ok(text) => match parse_diagnosis_response(&text) {
            Ok(result) => ProviderOutcome::Parsed(result),
            Err(e) => {
                tracing::debug!(error = %e, "Provider response did not parse");
                ProviderOutcome::Malformed(text)
            }
        },
        Err(e) => ProviderOutcome::TransportFailure(e),
    }
}

fn extract_json_object(response: &str) -> Result<&str, IntakeError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(IntakeError::MalformedResponse("Empty response".into()));
    }

    if let Some(start) = trimmed.find("```json") {
        let body_start = start + 7;
        let body_end = trimmed[body_start..]
            .find("```")
            .ok_or_else(|| IntakeError::MalformedResponse("Unclosed JSON block".into()))?;
        return Ok(trimmed[body_start..body_start + body_end].trim());
    }

    let open = trimmed
        .find('{')
        .ok_or_else(|| IntakeError::MalformedResponse("No JSON object found".into()))?;
    let close = trimmed
        .rfind('}')
        .filter(|close| *close > open)
        .ok_or_else(|| IntakeError::MalformedResponse("Unclosed JSON object".into()))?;
    Ok(&trimmed[open..=close])
}

fn parse_diagnosis_json(json_str: &str) -> Result<DiagnosisResult, IntakeError> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct RawResponse {
        recommended_department: Option<String>,
        alternative_departments: Option<Vec<serde_json::Value>>,
        urgency_level: Option<serde_json::Value>,
        recommendations: Option<Vec<serde_json::Value>>,
        warning_signs: Option<Vec<serde_json::Value>>,
        preventive_measures: Option<Vec<serde_json::Value>>,
        #[serde(alias = "additionalNotes")]
        reasoning_notes: Option<String>,
    }

    let raw: RawResponse = serde_json::from_str(json_str)
        .map_err(|e| IntakeError::MalformedResponse(e.to_string()))?;

    let recommended_department = raw
        .recommended_department
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .ok_or(IntakeError::MissingField("recommendedDepartment"))?;
    let alternative_departments = raw
        .alternative_departments
        .ok_or(IntakeError::MissingField("alternativeDepartments"))?;
    let urgency = raw
        .urgency_level
        .ok_or(IntakeError::MissingField("urgencyLevel"))?;
    let recommendations = raw
        .recommendations
        .ok_or(IntakeError::MissingField("recommendations"))?;

    if raw.warning_signs.is_none() || raw.preventive_measures.is_none() {
        tracing::debug!(
            warning_signs = raw.warning_signs.is_some(),
            preventive_measures = raw.preventive_measures.is_some(),
            "Provider omitted optional fields"
        );
    }

    Ok(DiagnosisResult {
        recommended_department,
        alternative_departments: parse_strings_lenient(&alternative_departments),
        urgency_level: parse_urgency(&urgency)?,
        recommendations: parse_strings_lenient(&recommendations),
        warning_signs: raw.warning_signs.as_deref().map(parse_strings_lenient),
        preventive_measures: raw.preventive_measures.as_deref().map(parse_strings_lenient),
        reasoning_notes: raw
            .reasoning_notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
    })
}

/// Urgency as an integer or numeric string within 1..=5.
fn parse_urgency(value: &serde_json::Value) -> Result<u8, IntakeError> {
    let level = match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match level {
        Some(l) if (MIN_URGENCY as u64..=MAX_URGENCY as u64).contains(&l) => Ok(l as u8),
        _ => Err(IntakeError::InvalidUrgency(value.to_string())),
    }
}

/// Keep the non-blank string items, skip everything else.
fn parse_strings_lenient(items: &[serde_json::Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
