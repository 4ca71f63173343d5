use serde::{Deserialize, Serialize};

/// Department recommendation returned to the guardian.
///
/// Produced once per analysis and replaced wholesale on re-analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
    pub recommended_department: String,
    pub alternative_departments: Vec<String>,
    /// 1 (can wait) to 5 (go now).
    pub urgency_level: u8,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_signs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preventive_measures: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_notes: Option<String>,
}
