use serde::Serialize;

use super::IntakeError;
use crate::models::{AgeBand, AgeDescriptor, SymptomDescriptor};

/// Oldest age for which a pediatric department is considered.
pub const PEDIATRIC_AGE_LIMIT: u8 = 15;

/// Age from which elderly considerations apply.
pub const ELDERLY_AGE_THRESHOLD: u8 = 65;

/// Symptom as sent to the prompt: catalog metadata stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedSymptom {
    pub name: String,
    pub description: String,
    pub duration: String,
    pub severity: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatientAge {
    Exact { age: u8 },
    Range { min: u8, max: u8, label: String, range_text: String },
    Unspecified,
}

impl PatientAge {
    /// Human-readable age, e.g. `30歳` or `7～12さいのしょうがっこう`.
    pub fn describe(&self) -> String {
        match self {
            Self::Exact { age } => format!("{age}歳"),
            Self::Range { label, range_text, .. } => format!("{range_text}の{label}"),
            Self::Unspecified => "年齢不明".to_string(),
        }
    }
}

/// Age and symptoms ready for prompt rendering. Never sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRequest {
    pub patient: PatientAge,
    pub band: Option<AgeBand>,
    pub guidance: String,
    pub pediatric_eligible: bool,
    pub symptoms: Vec<NormalizedSymptom>,
}

impl NormalizedRequest {
    pub fn age_description(&self) -> String {
        self.patient.describe()
    }
}

/// Map the selection and age into a prompt-ready request.
pub fn normalize(
    selection: &[SymptomDescriptor],
    age: Option<&AgeDescriptor>,
) -> Result<NormalizedRequest, IntakeError> {
    if selection.is_empty() {
        return Err(IntakeError::EmptySelection);
    }
    let age = age.ok_or(IntakeError::MissingAge)?;

    let patient = match age {
        AgeDescriptor::Exact { age } => PatientAge::Exact { age: *age },
        AgeDescriptor::Range { min, max, label, range_text } => PatientAge::Range {
            min: *min,
            max: *max,
            label: label.clone(),
            range_text: range_text.clone(),
        },
    };

    Ok(NormalizedRequest {
        guidance: age_guidance(&patient).to_string(),
        pediatric_eligible: pediatric_eligible(&patient),
        band: Some(age.band()),
        patient,
        symptoms: normalize_symptoms(selection),
    })
}

/// Request for flows that never established an age: general guidance only.
pub fn normalize_without_age(
    selection: &[SymptomDescriptor],
) -> Result<NormalizedRequest, IntakeError> {
    if selection.is_empty() {
        return Err(IntakeError::EmptySelection);
    }
    let patient = PatientAge::Unspecified;
    Ok(NormalizedRequest {
        guidance: age_guidance(&patient).to_string(),
        pediatric_eligible: pediatric_eligible(&patient),
        band: None,
        patient,
        symptoms: normalize_symptoms(selection),
    })
}

pub fn normalize_symptoms(selection: &[SymptomDescriptor]) -> Vec<NormalizedSymptom> {
    selection.iter().map(normalize_symptom).collect()
}

/// Keep name, description, duration and severity; drop key, category, icon
/// and suggested departments so the provider is not anchored to them.
pub fn normalize_symptom(symptom: &SymptomDescriptor) -> NormalizedSymptom {
    let mut description = symptom.description.trim().to_string();
    if !symptom.related.is_empty() {
        description = format!("{description} (関連症状: {})", symptom.related.join(", "))
            .trim()
            .to_string();
    }

    NormalizedSymptom {
        name: symptom.display_name.trim().to_string(),
        description,
        duration: symptom.duration.trim().to_string(),
        severity: symptom.severity,
    }
}

/// Department-selection guidance for the patient's age.
pub fn age_guidance(patient: &PatientAge) -> &'static str {
    match patient {
        PatientAge::Exact { age } if *age <= PEDIATRIC_AGE_LIMIT => "小児科での診療も検討可能です。",
        PatientAge::Exact { age } if *age >= ELDERLY_AGE_THRESHOLD => {
            "高齢者特有の症状にも注意が必要です。"
        }
        PatientAge::Exact { .. } => "成人の専門診療科での診療が適切です。",
        PatientAge::Range { max, .. } if *max <= PEDIATRIC_AGE_LIMIT => {
            "小児科での診療を中心に検討します。"
        }
        PatientAge::Range { min, .. } if *min >= ELDERLY_AGE_THRESHOLD => {
            "高齢者特有の症状に配慮が必要です。"
        }
        PatientAge::Range { min, .. } if *min > PEDIATRIC_AGE_LIMIT => {
            "成人の専門診療科を中心に検討します。"
        }
        PatientAge::Range { .. } | PatientAge::Unspecified => {
            "年齢層に応じた適切な診療科を検討します。"
        }
    }
}

/// Whether a pediatric department may be recommended.
pub fn pediatric_eligible(patient: &PatientAge) -> bool {
    match patient {
        PatientAge::Exact { age } => *age <= PEDIATRIC_AGE_LIMIT,
        PatientAge::Range { min, .. } => *min <= PEDIATRIC_AGE_LIMIT,
        PatientAge::Unspecified => true,
    }
}
