use serde::{Deserialize, Serialize};

use super::enums::SymptomCategory;

/// Severity assumed when the user did not rate a symptom.
pub const DEFAULT_SEVERITY: u8 = 3;

/// Highest severity on the 1-5 scale.
pub const MAX_SEVERITY: u8 = 5;

/// A symptom in the current selection, catalog-sourced or user-authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomDescriptor {
    pub key: String,
    pub category: SymptomCategory,
    pub display_name: String,
    pub kids_friendly_name: String,
    pub icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default = "default_severity")]
    pub severity: u8,
    #[serde(default)]
    pub is_custom: bool,
    /// Catalog hint for fallback results. Never sent to the provider.
    #[serde(default)]
    pub suggested_departments: Vec<String>,
    /// Related complaints the guardian attached to this symptom.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
}

fn default_severity() -> u8 {
    DEFAULT_SEVERITY
}

impl SymptomDescriptor {
    /// First non-blank suggested department.
    pub fn primary_department(&self) -> Option<&str> {
        self.suggested_departments
            .iter()
            .map(|d| d.trim())
            .find(|d| !d.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{
            "key": "fever",
            "category": "general",
            "displayName": "熱がある",
            "kidsFriendlyName": "ねつがある",
            "icon": "🤒"
        }"#;
        let symptom: SymptomDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(symptom.severity, DEFAULT_SEVERITY);
        assert!(symptom.description.is_empty());
        assert!(!symptom.is_custom);
        assert!(symptom.suggested_departments.is_empty());
    }

    #[test]
    fn primary_department_skips_blanks() {
        let json = r#"{
            "key": "x", "category": "skin", "displayName": "x",
            "kidsFriendlyName": "x", "icon": "x",
            "suggestedDepartments": ["  ", "皮膚科", "小児科"]
        }"#;
        let symptom: SymptomDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(symptom.primary_department(), Some("皮膚科"));
    }
}
