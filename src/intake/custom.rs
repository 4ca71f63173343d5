use std::collections::HashMap;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::IntakeError;
use crate::models::symptom::{DEFAULT_SEVERITY, MAX_SEVERITY};
use crate::models::{SymptomCategory, SymptomDescriptor};

/// Placeholder glyph for user-authored symptoms.
pub const CUSTOM_SYMPTOM_ICON: &str = "📝";

/// Department suggested for custom symptoms when the provider is unavailable.
pub const CUSTOM_SYMPTOM_DEPARTMENT: &str = "内科";

/// Free-text symptom form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomSymptomInput {
    pub name: String,
    pub description: String,
    pub duration: String,
    pub severity: Option<u8>,
    pub related: Vec<String>,
}

impl CustomSymptomInput {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

/// Time-based key, unique within a session even for same-millisecond builds.
pub fn generate_custom_key() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("custom-{}-{}", Utc::now().timestamp_millis(), &suffix[..8])
}

/// Turn the free-text form into a custom descriptor.
///
/// The caller registers the result in the selection and the
/// [`CustomSymptomTable`]; nothing is stored here.
pub fn build_custom_symptom(input: CustomSymptomInput) -> Result<SymptomDescriptor, IntakeError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(IntakeError::EmptySymptomName);
    }

    let severity = input.severity.unwrap_or(DEFAULT_SEVERITY);
    if !(1..=MAX_SEVERITY).contains(&severity) {
        return Err(IntakeError::InvalidSeverity(severity));
    }

    Ok(SymptomDescriptor {
        key: generate_custom_key(),
        category: SymptomCategory::Custom,
        display_name: name.to_string(),
        kids_friendly_name: name.to_string(),
        icon: CUSTOM_SYMPTOM_ICON.to_string(),
        description: input.description.trim().to_string(),
        duration: input.duration.trim().to_string(),
        severity,
        is_custom: true,
        suggested_departments: vec![CUSTOM_SYMPTOM_DEPARTMENT.to_string()],
        related: input
            .related
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect(),
    })
}

/// Custom symptoms built this session, keyed by generated key.
///
/// Keeps a custom symptom retrievable after it is toggled off.
#[derive(Debug, Clone, Default)]
pub struct CustomSymptomTable {
    symptoms: HashMap<String, SymptomDescriptor>,
}

impl CustomSymptomTable {
    pub fn register(&mut self, symptom: SymptomDescriptor) {
        self.symptoms.insert(symptom.key.clone(), symptom);
    }

    pub fn get(&self, key: &str) -> Option<&SymptomDescriptor> {
        self.symptoms.get(key)
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    pub fn clear(&mut self) {
        self.symptoms.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_custom_descriptor() {
        let symptom = build_custom_symptom(CustomSymptomInput::named("おなかがへん")).unwrap();
        assert!(symptom.is_custom);
        assert_eq!(symptom.category, SymptomCategory::Custom);
        assert!(symptom.key.starts_with("custom-"));
        assert_eq!(symptom.icon, CUSTOM_SYMPTOM_ICON);
        assert_eq!(symptom.kids_friendly_name, "おなかがへん");
        assert_eq!(symptom.severity, DEFAULT_SEVERITY);
        assert_eq!(symptom.suggested_departments, vec!["内科"]);
    }

    #[test]
    fn blank_name_is_rejected() {
        for name in ["", "   ", "\t\n"] {
            let err = build_custom_symptom(CustomSymptomInput::named(name)).unwrap_err();
            assert!(matches!(err, IntakeError::EmptySymptomName));
        }
    }

    #[test]
    fn severity_outside_scale_is_rejected() {
        for severity in [0, 6] {
            let input = CustomSymptomInput {
                severity: Some(severity),
                ..CustomSymptomInput::named("せなかがいたい")
            };
            assert!(matches!(
                build_custom_symptom(input),
                Err(IntakeError::InvalidSeverity(s)) if s == severity
            ));
        }
    }

    #[test]
    fn fields_are_trimmed() {
        let input = CustomSymptomInput {
            name: "  あたまがいたい ".into(),
            description: " うごくといたい ".into(),
            duration: " きのうから ".into(),
            severity: Some(4),
            related: vec![" ねつ ".into(), "  ".into()],
        };
        let symptom = build_custom_symptom(input).unwrap();
        assert_eq!(symptom.display_name, "あたまがいたい");
        assert_eq!(symptom.description, "うごくといたい");
        assert_eq!(symptom.duration, "きのうから");
        assert_eq!(symptom.severity, 4);
        assert_eq!(symptom.related, vec!["ねつ"]);
    }

    #[test]
    fn generated_keys_are_unique() {
        let keys: std::collections::HashSet<String> =
            (0..200).map(|_| generate_custom_key()).collect();
        assert_eq!(keys.len(), 200);
    }

    #[test]
    fn table_keeps_symptoms_by_key() {
        let mut table = CustomSymptomTable::default();
        let symptom = build_custom_symptom(CustomSymptomInput::named("みみがへん")).unwrap();
        let key = symptom.key.clone();
        table.register(symptom);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&key).unwrap().display_name, "みみがへん");
        table.clear();
        assert!(table.is_empty());
    }
}
