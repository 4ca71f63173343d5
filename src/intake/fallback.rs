use crate::models::{AgeBand, DiagnosisResult, SymptomDescriptor};

/// Urgency assigned when no provider answer is available.
pub const FALLBACK_URGENCY: u8 = 2;

pub const FALLBACK_RECOMMENDATIONS: [&str; 2] = [
    "できるだけ早めに医療機関を受診してください。",
    "症状が急激に悪化した場合は、救急外来を受診してください。",
];

pub const FALLBACK_WARNING_SIGNS: [&str; 2] = ["症状が急激に悪化", "普段と様子が大きく異なる"];

pub const FALLBACK_PREVENTIVE_MEASURES: [&str; 2] = ["十分な休息を取る", "水分を適切に取る"];

const PEDIATRIC_DEFAULT: &str = "小児科";
const ADULT_DEFAULT: &str = "内科";
const PEDIATRIC_ALTERNATIVES: [&str; 2] = ["内科", "総合診療科"];
const ADULT_ALTERNATIVES: [&str; 2] = ["総合診療科", "救急科"];
const GENERAL_NOTE: &str = "年齢に応じた診療科の受診をおすすめします";

/// Conservative result built from catalog hints alone.
///
/// Total: any selection, empty or not, yields a well-formed result.
pub fn build_fallback_result(
    symptoms: &[SymptomDescriptor],
    band: Option<AgeBand>,
) -> DiagnosisResult {
    let pediatric = band.map_or(true, |b| b.is_pediatric());

    let first = symptoms.first();
    let recommended_department = first
        .and_then(|s| s.primary_department())
        .map(str::to_string)
        .unwrap_or_else(|| {
            let default = if pediatric { PEDIATRIC_DEFAULT } else { ADULT_DEFAULT };
            default.to_string()
        });

    // Only the first symptom's remaining suggestions count as alternatives.
    let mut alternative_departments: Vec<String> = Vec::new();
    for department in first.into_iter().flat_map(|s| s.suggested_departments.iter()) {
        let department = department.trim();
        if !department.is_empty()
            && department != recommended_department
            && !alternative_departments.iter().any(|d| d == department)
        {
            alternative_departments.push(department.to_string());
        }
    }
    if alternative_departments.is_empty() {
        let defaults = if pediatric { PEDIATRIC_ALTERNATIVES } else { ADULT_ALTERNATIVES };
        alternative_departments = defaults
            .iter()
            .filter(|d| **d != recommended_department)
            .map(|d| d.to_string())
            .collect();
    }

    DiagnosisResult {
        recommended_department,
        alternative_departments,
        urgency_level: FALLBACK_URGENCY,
        recommendations: to_strings(&FALLBACK_RECOMMENDATIONS),
        warning_signs: Some(to_strings(&FALLBACK_WARNING_SIGNS)),
        preventive_measures: Some(to_strings(&FALLBACK_PREVENTIVE_MEASURES)),
        reasoning_notes: Some(band.map_or(GENERAL_NOTE, |b| b.default_note()).to_string()),
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
