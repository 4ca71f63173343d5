//! Symptom catalog: static reference data for the symptom picker.
//!
//! Symptoms are grouped by body-system category and keyed by a stable
//! camelCase key. Each entry carries a kid-friendly name and icon for the
//! picker plus the departments usually suggested for it. The departments are
//! only used when the analysis provider is unavailable; they are never sent
//! to the provider.

use serde::Serialize;

use crate::models::{SymptomCategory, SymptomDescriptor};
use crate::models::symptom::DEFAULT_SEVERITY;

// ═══════════════════════════════════════════
// Types
// ═══════════════════════════════════════════

#[derive(Debug)]
pub struct CatalogSymptom {
    pub key: &'static str,
    pub name: &'static str,
    pub kids_friendly_name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub departments: &'static [&'static str],
}

#[derive(Debug)]
pub struct CatalogCategory {
    pub category: SymptomCategory,
    pub symptoms: &'static [CatalogSymptom],
}

impl CatalogSymptom {
    /// Descriptor for the selection set, with default severity.
    pub fn to_descriptor(&self, category: SymptomCategory) -> SymptomDescriptor {
        SymptomDescriptor {
            key: self.key.to_string(),
            category,
            display_name: self.name.to_string(),
            kids_friendly_name: self.kids_friendly_name.to_string(),
            icon: self.icon.to_string(),
            description: self.description.to_string(),
            duration: String::new(),
            severity: DEFAULT_SEVERITY,
            is_custom: false,
            suggested_departments: self.departments.iter().map(|d| d.to_string()).collect(),
            related: Vec::new(),
        }
    }
}

/// Catalog entry as shown to the picker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntryView {
    pub key: &'static str,
    pub category: SymptomCategory,
    pub name: &'static str,
    pub kids_friendly_name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

/// One picker tab with its matching entries.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub category: SymptomCategory,
    pub title: &'static str,
    pub symptoms: Vec<CatalogEntryView>,
}

// ═══════════════════════════════════════════
// Catalog content
// ═══════════════════════════════════════════

macro_rules! symptom {
    ($key:literal, $name:literal, $kids:literal, $icon:literal, $desc:literal, [$($dept:literal),*]) => {
        CatalogSymptom {
            key: $key,
            name: $name,
            kids_friendly_name: $kids,
            icon: $icon,
            description: $desc,
            departments: &[$($dept),*],
        }
    };
}

pub static CATALOG: &[CatalogCategory] = &[
    CatalogCategory {
        category: SymptomCategory::General,
        symptoms: &[
            symptom!("fever", "熱がある", "ねつがある", "🤒", "体があたたかい", ["小児科", "内科"]),
            symptom!("fatigue", "だるい", "からだがだるい", "😪", "つかれている", ["小児科", "内科"]),
            symptom!("headache", "頭が痛い", "あたまがいたい", "🤕", "あたまがいたい", ["小児科", "内科", "脳神経外科"]),
            symptom!("dizziness", "めまいがする", "くらくらする", "💫", "ぐるぐるまわる", ["内科", "耳鼻咽喉科", "神経内科"]),
        ],
    },
    CatalogCategory {
        category: SymptomCategory::Respiratory,
        symptoms: &[
            symptom!("cough", "咳が出る", "せきがでる", "😷", "せきがでる", ["小児科", "内科", "呼吸器内科"]),
            symptom!("runnyNose", "鼻水が出る", "はなみずがでる", "🤧", "はなみずがでる", ["耳鼻咽喉科", "小児科"]),
            symptom!("breathingDifficulty", "息苦しい", "いきがしにくい", "😰", "いきがしにくい", ["呼吸器内科", "救急科"]),
            symptom!("soreThroat", "喉が痛い", "のどがいたい", "🗣️", "のみこむといたい", ["耳鼻咽喉科", "小児科"]),
        ],
    },
    CatalogCategory {
        category: SymptomCategory::Digestive,
        symptoms: &[
            symptom!("stomachache", "お腹が痛い", "おなかがいたい", "😣", "おなかがいたい", ["小児科", "消化器内科"]),
            symptom!("nausea", "吐き気がする", "むねむねする", "🤢", "むねむねする", ["小児科", "消化器内科"]),
            symptom!("diarrhea", "お腹がゆるい", "おなかがゆるい", "💩", "おなかがゆるい", ["小児科", "消化器内科"]),
            symptom!("vomiting", "吐いた", "はいちゃった", "🤮", "たべたものをはいた", ["小児科", "消化器内科"]),
        ],
    },
    CatalogCategory {
        category: SymptomCategory::Skin,
        symptoms: &[
            symptom!("rash", "発疹がある", "ぶつぶつがある", "🔴", "はだにぶつぶつができた", ["皮膚科", "小児科"]),
            symptom!("itching", "かゆい", "かゆい", "🫳", "かきたくなる", ["皮膚科"]),
            symptom!("burn", "やけどした", "やけどした", "🔥", "あついものにさわった", ["皮膚科", "形成外科"]),
        ],
    },
    CatalogCategory {
        category: SymptomCategory::Eyes,
        symptoms: &[
            symptom!("redEye", "目が赤い", "めがあかい", "👁️", "めがまっか", ["眼科"]),
            symptom!("eyeItch", "目がかゆい", "めがかゆい", "😖", "めをこすりたい", ["眼科", "アレルギー科"]),
            symptom!("blurredVision", "見えにくい", "よくみえない", "👓", "ぼやけてみえる", ["眼科"]),
        ],
    },
    CatalogCategory {
        category: SymptomCategory::Ears,
        symptoms: &[
            symptom!("earache", "耳が痛い", "みみがいたい", "👂", "みみのおくがいたい", ["耳鼻咽喉科", "小児科"]),
            symptom!("hearingLoss", "聞こえにくい", "きこえにくい", "🔇", "おとがちいさくきこえる", ["耳鼻咽喉科"]),
        ],
    },
    CatalogCategory {
        category: SymptomCategory::Mouth,
        symptoms: &[
            symptom!("toothache", "歯が痛い", "はがいたい", "🦷", "はがずきずきする", ["歯科", "小児歯科"]),
            symptom!("mouthSore", "口内炎がある", "くちのなかがいたい", "👄", "くちのなかにできものがある", ["歯科口腔外科", "耳鼻咽喉科"]),
        ],
    },
    CatalogCategory {
        category: SymptomCategory::Mental,
        symptoms: &[
            symptom!("anxiety", "不安な気持ち", "しんぱいなきもち", "😟", "こころがざわざわする", ["児童精神科", "心療内科"]),
            symptom!("sleeplessness", "眠れない", "ねむれない", "🌙", "よるねむれない", ["心療内科", "小児科"]),
        ],
    },
    CatalogCategory {
        category: SymptomCategory::Emergency,
        symptoms: &[
            symptom!("seizure", "けいれんしている", "からだがぴくぴくする", "⚡", "からだがかってにうごく", ["救急科", "小児科"]),
            symptom!("unconscious", "意識がない", "よんでもおきない", "🚨", "よびかけにこたえない", ["救急科"]),
            symptom!("severeBleeding", "出血が止まらない", "ちがとまらない", "🩸", "ちがたくさんでる", ["救急科", "外科"]),
        ],
    },
];

// ═══════════════════════════════════════════
// Lookups
// ═══════════════════════════════════════════

pub fn symptoms_in(category: SymptomCategory) -> &'static [CatalogSymptom] {
    CATALOG
        .iter()
        .find(|c| c.category == category)
        .map(|c| c.symptoms)
        .unwrap_or(&[])
}

pub fn category_title(category: SymptomCategory) -> &'static str {
    category.title()
}

/// Look up a catalog symptom by category and key.
pub fn lookup(category: SymptomCategory, key: &str) -> Option<&'static CatalogSymptom> {
    symptoms_in(category).iter().find(|s| s.key == key)
}

/// Filter the catalog by a search term over display and kid-friendly names.
///
/// `category == None` searches every tab. Empty categories are omitted.
pub fn search(term: &str, category: Option<SymptomCategory>) -> Vec<CategoryView> {
    let needle = term.trim().to_lowercase();

    CATALOG
        .iter()
        .filter(|c| category.map_or(true, |wanted| wanted == c.category))
        .filter_map(|c| {
            let symptoms: Vec<CatalogEntryView> = c
                .symptoms
                .iter()
                .filter(|s| {
                    needle.is_empty()
                        || format!("{} {}", s.name, s.kids_friendly_name)
                            .to_lowercase()
                            .contains(&needle)
                })
                .map(|s| CatalogEntryView {
                    key: s.key,
                    category: c.category,
                    name: s.name,
                    kids_friendly_name: s.kids_friendly_name,
                    icon: s.icon,
                    description: s.description,
                })
                .collect();

            if symptoms.is_empty() {
                None
            } else {
                Some(CategoryView {
                    category: c.category,
                    title: c.category.title(),
                    symptoms,
                })
            }
        })
        .collect()
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn lookup_finds_known_symptom() {
        let fever = lookup(SymptomCategory::General, "fever").unwrap();
        assert_eq!(fever.name, "熱がある");
        assert_eq!(fever.kids_friendly_name, "ねつがある");
    }

    #[test]
    fn lookup_respects_category() {
        assert!(lookup(SymptomCategory::Respiratory, "fever").is_none());
        assert!(lookup(SymptomCategory::Custom, "fever").is_none());
    }

    #[test]
    fn keys_are_unique_across_catalog() {
        let mut seen = HashSet::new();
        for category in CATALOG {
            for symptom in category.symptoms {
                assert!(seen.insert(symptom.key), "duplicate key {}", symptom.key);
            }
        }
    }

    #[test]
    fn every_catalog_symptom_suggests_a_department() {
        for category in CATALOG {
            assert_ne!(category.category, SymptomCategory::Custom);
            for symptom in category.symptoms {
                assert!(!symptom.departments.is_empty(), "{} has no departments", symptom.key);
            }
        }
    }

    #[test]
    fn descriptor_carries_catalog_fields() {
        let descriptor = lookup(SymptomCategory::Digestive, "nausea")
            .unwrap()
            .to_descriptor(SymptomCategory::Digestive);
        assert_eq!(descriptor.key, "nausea");
        assert_eq!(descriptor.category, SymptomCategory::Digestive);
        assert_eq!(descriptor.severity, DEFAULT_SEVERITY);
        assert!(!descriptor.is_custom);
        assert_eq!(descriptor.suggested_departments, vec!["小児科", "消化器内科"]);
    }

    #[test]
    fn search_matches_kid_friendly_name() {
        let results = search("おなか", None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].category, SymptomCategory::Digestive);
        assert!(results[0].symptoms.iter().any(|s| s.key == "stomachache"));
    }

    #[test]
    fn empty_search_lists_whole_category() {
        let results = search("", Some(SymptomCategory::Ears));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symptoms.len(), symptoms_in(SymptomCategory::Ears).len());
        assert_eq!(results[0].title, "みみ");
    }

    #[test]
    fn search_without_matches_is_empty() {
        assert!(search("zzz-not-a-symptom", None).is_empty());
    }
}
