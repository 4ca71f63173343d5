use serde::Serialize;

use super::IntakeError;
use crate::models::age::MAX_AGE;
use crate::models::AgeDescriptor;

/// A selectable age group on the first screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeBucket {
    pub min: u8,
    pub max: u8,
    pub label: &'static str,
    pub icon: &'static str,
}

/// Non-overlapping buckets covering 0-120, youngest first.
pub const AGE_BUCKETS: &[AgeBucket] = &[
    AgeBucket { min: 0, max: 2, label: "あかちゃん", icon: "👶" },
    AgeBucket { min: 3, max: 6, label: "ようちえん", icon: "🎨" },
    AgeBucket { min: 7, max: 12, label: "しょうがっこう", icon: "🏫" },
    AgeBucket { min: 13, max: 15, label: "ちゅうがっこう", icon: "📚" },
    AgeBucket { min: 16, max: 18, label: "こうこうせい", icon: "🎒" },
    AgeBucket { min: 19, max: 64, label: "おとな", icon: "👤" },
    AgeBucket { min: 65, max: MAX_AGE, label: "シニア", icon: "🧓" },
];

impl AgeBucket {
    pub fn range_text(&self) -> String {
        format!("{}～{}さい", self.min, self.max)
    }
}

/// Range descriptor for a bucket.
pub fn select_bucket(bucket: &AgeBucket) -> AgeDescriptor {
    AgeDescriptor::Range {
        min: bucket.min,
        max: bucket.max,
        label: bucket.label.to_string(),
        range_text: bucket.range_text(),
    }
}

pub fn bucket_by_label(label: &str) -> Option<&'static AgeBucket> {
    AGE_BUCKETS.iter().find(|b| b.label == label.trim())
}

/// Parse a typed age. Accepts whole numbers in 1..=120 only.
pub fn parse_exact_age(raw: &str) -> Result<AgeDescriptor, IntakeError> {
    let trimmed = raw.trim();
    match trimmed.parse::<u8>() {
        Ok(age) if (1..=MAX_AGE).contains(&age) => Ok(AgeDescriptor::Exact { age }),
        _ => Err(IntakeError::InvalidAge(trimmed.to_string())),
    }
}

/// Typed-age entry: `None` leaves the current selection untouched.
pub fn select_exact(raw: &str) -> Option<AgeDescriptor> {
    parse_exact_age(raw).ok()
}
