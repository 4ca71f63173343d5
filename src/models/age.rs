use serde::{Deserialize, Serialize};

/// Oldest age accepted anywhere in the intake flow.
pub const MAX_AGE: u8 = 120;

/// Normalized patient age: an exact age or a bucketed range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AgeDescriptor {
    Exact {
        age: u8,
    },
    #[serde(rename_all = "camelCase")]
    Range {
        min: u8,
        max: u8,
        label: String,
        range_text: String,
    },
}

impl AgeDescriptor {
    /// Age used to resolve the developmental band.
    /// Ranges resolve from their lower bound.
    pub fn band_age(&self) -> u8 {
        match self {
            Self::Exact { age } => *age,
            Self::Range { min, .. } => *min,
        }
    }

    pub fn band(&self) -> AgeBand {
        AgeBand::for_age(self.band_age())
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact { .. })
    }
}

/// Developmental age band used for prompt wording and fallback notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    Infancy,
    EarlyChildhood,
    SchoolAge,
    EarlyAdolescence,
    LateAdolescence,
    Adulthood,
    Elderly,
}

impl AgeBand {
    pub fn for_age(age: u8) -> Self {
        match age {
            0..=2 => Self::Infancy,
            3..=6 => Self::EarlyChildhood,
            7..=12 => Self::SchoolAge,
            13..=15 => Self::EarlyAdolescence,
            16..=18 => Self::LateAdolescence,
            19..=64 => Self::Adulthood,
            _ => Self::Elderly,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Infancy => "乳児期",
            Self::EarlyChildhood => "幼児期",
            Self::SchoolAge => "学童期",
            Self::EarlyAdolescence => "思春期前期",
            Self::LateAdolescence => "思春期後期",
            Self::Adulthood => "成人期",
            Self::Elderly => "高齢期",
        }
    }

    /// Age-specific note attached to fallback results.
    pub fn default_note(&self) -> &'static str {
        match self {
            Self::Infancy => "乳児期特有の注意が必要です",
            Self::EarlyChildhood => "幼児期特有の注意が必要です",
            Self::SchoolAge => "学童期特有の注意が必要です",
            Self::EarlyAdolescence | Self::LateAdolescence => "思春期特有の注意が必要です",
            Self::Adulthood => "年齢に応じた健康管理が重要です",
            Self::Elderly => "高齢者特有の注意が必要です",
        }
    }

    /// Whether a pediatric department is an appropriate default.
    pub fn is_pediatric(&self) -> bool {
        matches!(
            self,
            Self::Infancy | Self::EarlyChildhood | Self::SchoolAge | Self::EarlyAdolescence
        )
    }
}
