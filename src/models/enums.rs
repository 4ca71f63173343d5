use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(SymptomCategory {
    General => "general",
    Respiratory => "respiratory",
    Digestive => "digestive",
    Skin => "skin",
    Eyes => "eyes",
    Ears => "ears",
    Mouth => "mouth",
    Mental => "mental",
    Emergency => "emergency",
    Custom => "custom",
});

impl SymptomCategory {
    /// Tab order used by the symptom picker.
    pub const ALL: [SymptomCategory; 10] = [
        Self::General,
        Self::Respiratory,
        Self::Digestive,
        Self::Skin,
        Self::Eyes,
        Self::Ears,
        Self::Mouth,
        Self::Mental,
        Self::Emergency,
        Self::Custom,
    ];

    /// Kid-friendly tab title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::General => "からだぜんたい",
            Self::Respiratory => "いきとせき",
            Self::Digestive => "おなか",
            Self::Skin => "はだ",
            Self::Eyes => "め",
            Self::Ears => "みみ",
            Self::Mouth => "くち",
            Self::Mental => "こころ",
            Self::Emergency => "きんきゅう",
            Self::Custom => "じぶんでかいた",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn category_round_trips_through_str() {
        for category in SymptomCategory::ALL {
            assert_eq!(SymptomCategory::from_str(category.as_str()).unwrap(), category);
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = SymptomCategory::from_str("elbows").unwrap_err();
        assert!(err.to_string().contains("elbows"));
    }

    #[test]
    fn category_serializes_as_lowercase_name() {
        let json = serde_json::to_string(&SymptomCategory::Respiratory).unwrap();
        assert_eq!(json, "\"respiratory\"");
    }
}
