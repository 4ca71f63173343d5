use std::fmt::Write;

use super::normalize::{NormalizedRequest, NormalizedSymptom, PEDIATRIC_AGE_LIMIT};

/// Adult specialist departments listed to seed the model's vocabulary.
pub const ADULT_DEPARTMENT_EXAMPLES: &[(&str, &str)] = &[
    (
        "内科系",
        "消化器内科、循環器内科、呼吸器内科、神経内科、血液内科、腎臓内科、内分泌代謝内科など",
    ),
    ("外科系", "消化器外科、心臓血管外科、呼吸器外科、脳神経外科など"),
    ("その他", "耳鼻咽喉科、眼科、皮膚科、整形外科、精神科、救急科など"),
];

const RESPONSE_SCHEMA: &str = r#"{
  "recommendedDepartment": "最適な診療科",
  "alternativeDepartments": ["その他の検討可能な診療科"],
  "urgencyLevel": 1から5の整数（5が最も緊急）,
  "recommendations": ["受診までの注意点"],
  "warningSigns": ["この症状が出たらすぐ受診"],
  "preventiveMeasures": ["気をつけること"],
  "reasoningNotes": "診療科選択の理由"
}"#;

/// Render the department-recommendation prompt.
///
/// Pure: the same request always renders to the same bytes.
pub fn build_diagnosis_prompt(request: &NormalizedRequest) -> String {
    let age = request.age_description();
    let complaints: Vec<&str> = request.symptoms.iter().map(|s| s.name.as_str()).collect();

    let mut prompt = String::new();
    prompt.push_str("あなたは総合診療医として、患者の症状から最適な診療科を提案してください。\n\n");

    prompt.push_str("[患者基本情報]\n===============\n");
    let _ = writeln!(prompt, "• 患者: {age}");
    let _ = writeln!(prompt, "• {}", request.guidance);
    let _ = writeln!(prompt, "• 主訴: {}", complaints.join("、"));
    prompt.push('\n');

    prompt.push_str("[詳細な症状情報]\n===============\n");
    for (i, symptom) in request.symptoms.iter().enumerate() {
        render_symptom(&mut prompt, i + 1, symptom);
    }

    prompt.push_str("[診療科選択の注意事項]\n===============\n");
    let _ = writeln!(prompt, "• この年齢層（{age}）に最適な診療科を選択してください");
    let _ = writeln!(prompt, "• {}", request.guidance);
    if !request.pediatric_eligible {
        let _ = writeln!(
            prompt,
            "• 患者は{}歳を超えているため、小児科は選択肢から除外してください",
            PEDIATRIC_AGE_LIMIT
        );
    }
    prompt.push_str("• 症状の組み合わせを考慮して、最適な診療科を選択してください\n");
    prompt.push_str("• 必要に応じて複数の診療科を提案してください\n\n");

    prompt.push_str("[成人の専門診療科の例]\n===============\n");
    for (group, departments) in ADULT_DEPARTMENT_EXAMPLES {
        let _ = writeln!(prompt, "• {group}: {departments}");
    }
    prompt.push('\n');

    prompt.push_str("[回答形式]\n===============\n");
    prompt.push_str("以下のキーを持つJSONオブジェクトのみで回答してください。前後に説明文を付けないでください:\n");
    prompt.push_str(RESPONSE_SCHEMA);
    prompt.push('\n');

    prompt
}

fn render_symptom(prompt: &mut String, index: usize, symptom: &NormalizedSymptom) {
    let _ = writeln!(prompt, "症状{index}: {}", symptom.name);
    if !symptom.description.is_empty() {
        let _ = writeln!(prompt, "状態: {}", symptom.description);
    }
    if !symptom.duration.is_empty() {
        let _ = writeln!(prompt, "期間: {}", symptom.duration);
    }
    if symptom.severity > 0 {
        let _ = writeln!(prompt, "強さ: {}/5", symptom.severity);
    }
    prompt.push('\n');
}
