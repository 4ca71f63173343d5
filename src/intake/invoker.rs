use std::sync::Arc;

use super::fallback::build_fallback_result;
use super::normalize::{normalize, normalize_without_age};
use super::parser::classify_response;
use super::prompt::build_diagnosis_prompt;
use super::provider::{AnalysisProvider, ProviderOutcome};
use crate::models::{AgeDescriptor, DiagnosisResult, SymptomDescriptor};

/// Retries after the first provider attempt.
pub const DEFAULT_MAX_RETRIES: usize = 2;

/// How an analysis result was obtained. Kept for logs and session state;
/// never serialized to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Succeeded,
    FallenBack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub result: DiagnosisResult,
    pub kind: AnalysisKind,
}

/// Drives one analysis: normalize, prompt, call the provider with retries,
/// parse, and fall back when nothing usable came back.
pub struct AnalysisInvoker {
    provider: Arc<dyn AnalysisProvider>,
    max_retries: usize,
}

impl AnalysisInvoker {
    pub fn new(provider: Arc<dyn AnalysisProvider>, max_retries: usize) -> Self {
        Self {
            provider,
            max_retries,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Never fails once the selection is non-empty: provider and parse
    /// failures degrade to the fallback result. `None` for an empty selection.
    pub async fn analyze(
        &self,
        symptoms: &[SymptomDescriptor],
        age: Option<&AgeDescriptor>,
    ) -> Option<Analysis> {
        let request = match age {
            Some(_) => normalize(symptoms, age),
            None => normalize_without_age(symptoms),
        }
        .ok()?;

        let prompt = build_diagnosis_prompt(&request);
        tracing::debug!(
            provider = self.provider.name(),
            symptoms = request.symptoms.len(),
            age = %request.age_description(),
            "Starting analysis"
        );

        for attempt in 0..=self.max_retries {
            let outcome = classify_response(self.provider.complete(&prompt).await);
            match outcome {
                ProviderOutcome::Parsed(result) => {
                    tracing::info!(
                        attempt = attempt + 1,
                        department = %result.recommended_department,
                        urgency = result.urgency_level,
                        "Analysis succeeded"
                    );
                    return Some(Analysis {
                        result,
                        kind: AnalysisKind::Succeeded,
                    });
                }
                ref failed if failed.is_retryable() && attempt < self.max_retries => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        outcome = outcome_label(failed),
                        "Provider attempt failed, retrying"
                    );
                }
                ProviderOutcome::Malformed(raw) => {
                    tracing::warn!(attempt = attempt + 1, "Provider response unusable, falling back");
                    tracing::debug!(raw = %raw, "Unusable provider response");
                    break;
                }
                ProviderOutcome::TransportFailure(err) => {
                    tracing::warn!(attempt = attempt + 1, error = %err, "Provider call failed, falling back");
                    break;
                }
            }
        }

        Some(Analysis {
            result: build_fallback_result(symptoms, request.band),
            kind: AnalysisKind::FallenBack,
        })
    }
}

fn outcome_label(outcome: &ProviderOutcome) -> &'static str {
    match outcome {
        ProviderOutcome::Parsed(_) => "parsed",
        ProviderOutcome::Malformed(_) => "malformed",
        ProviderOutcome::TransportFailure(_) => "transport_failure",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::intake::custom::{build_custom_symptom, CustomSymptomInput};
    use crate::intake::fallback::FALLBACK_URGENCY;
    use crate::intake::provider::{MockProvider, ProviderError};
    use crate::models::SymptomCategory;

    const VALID_RESPONSE: &str = r#"{"recommendedDepartment":"消化器内科","alternativeDepartments":["内科"],"urgencyLevel":3,"recommendations":["水分をとる"],"warningSigns":["血便"],"preventiveMeasures":["手洗い"],"reasoningNotes":"腹痛"}"#;

    fn stomachache() -> SymptomDescriptor {
        catalog::lookup(SymptomCategory::Digestive, "stomachache")
            .unwrap()
            .to_descriptor(SymptomCategory::Digestive)
    }

    fn invoker(mock: &Arc<MockProvider>) -> AnalysisInvoker {
        AnalysisInvoker::new(mock.clone(), DEFAULT_MAX_RETRIES)
    }

    #[tokio::test]
    async fn adult_exact_age_returns_provider_result_unmodified() {
        let mock = Arc::new(MockProvider::replying(VALID_RESPONSE));
        let age = AgeDescriptor::Exact { age: 30 };
        let analysis = invoker(&mock)
            .analyze(&[stomachache()], Some(&age))
            .await
            .unwrap();

        let expected: DiagnosisResult = serde_json::from_str(VALID_RESPONSE).unwrap();
        assert_eq!(analysis.result, expected);
        assert_eq!(analysis.kind, AnalysisKind::Succeeded);
        assert_eq!(mock.calls(), 1);

        let prompt = &mock.prompts()[0];
        assert!(prompt.contains("30歳"));
        assert!(prompt.contains("小児科は選択肢から除外してください"));
    }

    #[tokio::test]
    async fn provider_failure_yields_fallback() {
        let mock = Arc::new(MockProvider::failing(ProviderError::Connection("down".into())));
        let age = AgeDescriptor::Exact { age: 30 };
        let analysis = invoker(&mock)
            .analyze(&[stomachache()], Some(&age))
            .await
            .unwrap();

        assert_eq!(analysis.kind, AnalysisKind::FallenBack);
        assert_eq!(analysis.result.urgency_level, FALLBACK_URGENCY);
        assert_eq!(analysis.result.recommendations.len(), 2);
        assert_eq!(analysis.result.recommended_department, "小児科");
        assert_eq!(mock.calls(), DEFAULT_MAX_RETRIES + 1);
    }

    #[tokio::test]
    async fn retry_then_success() {
        let mock = Arc::new(MockProvider::new(vec![
            Err(ProviderError::Timeout(30)),
            Ok("申し訳ありません".into()),
            Ok(VALID_RESPONSE.into()),
        ]));
        let age = AgeDescriptor::Exact { age: 8 };
        let analysis = invoker(&mock)
            .analyze(&[stomachache()], Some(&age))
            .await
            .unwrap();

        assert_eq!(analysis.kind, AnalysisKind::Succeeded);
        assert_eq!(analysis.result.recommended_department, "消化器内科");
        assert_eq!(mock.calls(), 3);
        let prompts = mock.prompts();
        assert!(prompts.iter().all(|p| p == &prompts[0]));
    }

    #[tokio::test]
    async fn non_retryable_failure_falls_back_immediately() {
        let mock = Arc::new(MockProvider::failing(ProviderError::MissingCredentials));
        let analysis = invoker(&mock)
            .analyze(&[stomachache()], Some(&AgeDescriptor::Exact { age: 40 }))
            .await
            .unwrap();
        assert_eq!(analysis.kind, AnalysisKind::FallenBack);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn malformed_json_is_treated_like_failure() {
        let mock = Arc::new(MockProvider::replying(r#"{"recommendedDepartment":"内科"}"#));
        let analysis = invoker(&mock)
            .analyze(&[stomachache()], Some(&AgeDescriptor::Exact { age: 5 }))
            .await
            .unwrap();
        assert_eq!(analysis.kind, AnalysisKind::FallenBack);
        assert_eq!(
            analysis.result.reasoning_notes.as_deref(),
            Some("幼児期特有の注意が必要です")
        );
    }

    #[tokio::test]
    async fn empty_selection_is_none_without_calling_provider() {
        let mock = Arc::new(MockProvider::replying(VALID_RESPONSE));
        assert!(invoker(&mock)
            .analyze(&[], Some(&AgeDescriptor::Exact { age: 5 }))
            .await
            .is_none());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn missing_age_uses_general_guidance() {
        let mock = Arc::new(MockProvider::replying(VALID_RESPONSE));
        let analysis = invoker(&mock).analyze(&[stomachache()], None).await.unwrap();
        assert_eq!(analysis.kind, AnalysisKind::Succeeded);
        assert!(mock.prompts()[0].contains("年齢層に応じた適切な診療科を検討します。"));
    }

    #[tokio::test]
    async fn custom_symptom_round_trip() {
        let custom = build_custom_symptom(CustomSymptomInput {
            description: "ずきずきする".into(),
            ..CustomSymptomInput::named("ひざがいたい")
        })
        .unwrap();
        let failing = Arc::new(MockProvider::failing(ProviderError::Timeout(1)));
        let analysis = invoker(&failing)
            .analyze(&[custom], Some(&AgeDescriptor::Exact { age: 10 }))
            .await
            .unwrap();

        assert!(failing.prompts()[0].contains("症状1: ひざがいたい"));
        assert!(failing.prompts()[0].contains("状態: ずきずきする"));
        assert_eq!(analysis.result.recommended_department, "内科");
    }
}
