use std::time::{Duration, Instant};

use serde::Serialize;
use uuid::Uuid;

use super::age::{bucket_by_label, parse_exact_age, select_bucket};
use super::custom::{build_custom_symptom, CustomSymptomInput, CustomSymptomTable};
use super::invoker::{Analysis, AnalysisKind};
use super::selection::{SelectionStore, Toggle};
use super::IntakeError;
use crate::models::{AgeDescriptor, DiagnosisResult, SymptomCategory, SymptomDescriptor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    Analyzing,
    Succeeded(DiagnosisResult),
    FallenBack(DiagnosisResult),
}

/// Identifies one analysis request against the session it started in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub generation: u64,
    pub request_id: u64,
}

/// Everything an analysis needs, copied out so no lock is held while it runs.
#[derive(Debug, Clone)]
pub struct PendingAnalysis {
    pub ticket: AnalysisTicket,
    pub symptoms: Vec<SymptomDescriptor>,
    pub age: AgeDescriptor,
}

/// One guardian's intake flow: age, symptoms, and the latest result.
#[derive(Debug)]
pub struct IntakeSession {
    id: Uuid,
    age: Option<AgeDescriptor>,
    selection: SelectionStore,
    custom: CustomSymptomTable,
    state: AnalysisState,
    generation: u64,
    next_request_id: u64,
    in_flight: Option<u64>,
    touched_at: Instant,
}

impl IntakeSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            age: None,
            selection: SelectionStore::new(),
            custom: CustomSymptomTable::default(),
            state: AnalysisState::Idle,
            generation: 0,
            next_request_id: 0,
            in_flight: None,
            touched_at: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn age(&self) -> Option<&AgeDescriptor> {
        self.age.as_ref()
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn touch(&mut self) {
        self.touched_at = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.touched_at.elapsed()
    }

    // ── Age ─────────────────────────────────────────────────

    pub fn select_bucket(&mut self, label: &str) -> Result<&AgeDescriptor, IntakeError> {
        let bucket =
            bucket_by_label(label).ok_or_else(|| IntakeError::UnknownAgeBucket(label.to_string()))?;
        Ok(self.age.insert(select_bucket(bucket)))
    }

    /// Invalid input leaves the previous age in place.
    pub fn select_exact(&mut self, raw: &str) -> Result<&AgeDescriptor, IntakeError> {
        let age = parse_exact_age(raw)?;
        Ok(self.age.insert(age))
    }

    // ── Symptoms ────────────────────────────────────────────

    pub fn toggle_symptom(
        &mut self,
        key: &str,
        category: SymptomCategory,
    ) -> Result<Toggle, IntakeError> {
        match category {
            SymptomCategory::Custom => self.selection.toggle_custom(key, &self.custom),
            _ => self.selection.toggle(key, category),
        }
    }

    pub fn add_custom(&mut self, input: CustomSymptomInput) -> Result<SymptomDescriptor, IntakeError> {
        let symptom = build_custom_symptom(input)?;
        self.custom.register(symptom.clone());
        self.selection.add_custom(symptom.clone());
        Ok(symptom)
    }

    pub fn remove_symptom(&mut self, key: &str) -> bool {
        self.selection.remove(key)
    }

    // ── Analysis ────────────────────────────────────────────

    pub fn is_analyzing(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn result(&self) -> Option<&DiagnosisResult> {
        match &self.state {
            AnalysisState::Succeeded(r) | AnalysisState::FallenBack(r) => Some(r),
            AnalysisState::Idle | AnalysisState::Analyzing => None,
        }
    }

    /// Mark an analysis in flight and hand out its inputs.
    pub fn begin_analysis(&mut self) -> Result<PendingAnalysis, IntakeError> {
        if self.in_flight.is_some() {
            return Err(IntakeError::AnalysisInProgress);
        }
        if self.selection.is_empty() {
            return Err(IntakeError::EmptySelection);
        }
        let age = self.age.clone().ok_or(IntakeError::MissingAge)?;

        self.next_request_id += 1;
        let ticket = AnalysisTicket {
            generation: self.generation,
            request_id: self.next_request_id,
        };
        self.in_flight = Some(ticket.request_id);
        self.state = AnalysisState::Analyzing;

        Ok(PendingAnalysis {
            ticket,
            symptoms: self.selection.as_slice().to_vec(),
            age,
        })
    }

    /// Apply a finished analysis. Returns `false` when the session was reset
    /// since the ticket was issued and the result was discarded.
    pub fn complete_analysis(&mut self, ticket: AnalysisTicket, analysis: Analysis) -> bool {
        if self.in_flight == Some(ticket.request_id) {
            self.in_flight = None;
        }
        if ticket.generation != self.generation {
            tracing::debug!(
                session_id = %self.id,
                ticket_generation = ticket.generation,
                current_generation = self.generation,
                "Discarding stale analysis result"
            );
            return false;
        }

        self.state = match analysis.kind {
            AnalysisKind::Succeeded => AnalysisState::Succeeded(analysis.result),
            AnalysisKind::FallenBack => AnalysisState::FallenBack(analysis.result),
        };
        true
    }

    /// Release the in-flight marker when an analysis produced nothing.
    pub fn abandon_analysis(&mut self, ticket: AnalysisTicket) {
        if self.in_flight == Some(ticket.request_id) {
            self.in_flight = None;
            if ticket.generation == self.generation {
                self.state = AnalysisState::Idle;
            }
        }
    }

    /// Back to the first screen. An in-flight analysis keeps running but its
    /// result will be discarded.
    pub fn reset(&mut self) {
        self.age = None;
        self.selection.clear();
        self.custom.clear();
        self.state = AnalysisState::Idle;
        self.generation += 1;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            age: self.age.clone(),
            symptoms: self.selection.as_slice().to_vec(),
            analyzing: self.is_analyzing(),
            result: self.result().cloned(),
        }
    }
}

impl Default for IntakeSession {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub age: Option<AgeDescriptor>,
    pub symptoms: Vec<SymptomDescriptor>,
    pub analyzing: bool,
    pub result: Option<DiagnosisResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::fallback::build_fallback_result;

    fn ready_session() -> IntakeSession {
        let mut session = IntakeSession::new();
        session.select_exact("7").unwrap();
        session.toggle_symptom("fever", SymptomCategory::General).unwrap();
        session
    }

    fn fallback_analysis(session: &PendingAnalysis) -> Analysis {
        Analysis {
            result: build_fallback_result(&session.symptoms, Some(session.age.band())),
            kind: AnalysisKind::FallenBack,
        }
    }

    #[test]
    fn begin_requires_symptoms_and_age() {
        let mut session = IntakeSession::new();
        assert!(matches!(session.begin_analysis(), Err(IntakeError::EmptySelection)));

        session.toggle_symptom("cough", SymptomCategory::Respiratory).unwrap();
        assert!(matches!(session.begin_analysis(), Err(IntakeError::MissingAge)));
        assert!(!session.is_analyzing());
    }

    #[test]
    fn single_in_flight_analysis() {
        let mut session = ready_session();
        let pending = session.begin_analysis().unwrap();
        assert!(session.is_analyzing());
        assert!(matches!(session.begin_analysis(), Err(IntakeError::AnalysisInProgress)));

        let analysis = fallback_analysis(&pending);
        assert!(session.complete_analysis(pending.ticket, analysis));
        assert!(!session.is_analyzing());
        assert!(matches!(session.state(), AnalysisState::FallenBack(_)));
        assert!(session.begin_analysis().is_ok());
    }

    #[test]
    fn stale_generation_is_discarded() {
        let mut session = ready_session();
        let pending = session.begin_analysis().unwrap();
        session.reset();
        assert!(session.is_analyzing());

        let analysis = fallback_analysis(&pending);
        assert!(!session.complete_analysis(pending.ticket, analysis));
        assert!(session.result().is_none());
        assert_eq!(session.state(), &AnalysisState::Idle);
        assert!(!session.is_analyzing());
    }

    #[test]
    fn reset_clears_everything_but_identity() {
        let mut session = ready_session();
        session.add_custom(CustomSymptomInput::named("ひざがいたい")).unwrap();
        let id = session.id();
        session.reset();

        assert_eq!(session.id(), id);
        assert!(session.age().is_none());
        assert!(session.selection().is_empty());
        assert_eq!(session.generation(), 1);
    }

    #[test]
    fn invalid_exact_age_keeps_previous() {
        let mut session = IntakeSession::new();
        session.select_bucket("ようちえん").unwrap();
        assert!(matches!(session.select_exact("130"), Err(IntakeError::InvalidAge(_))));
        assert!(matches!(session.age(), Some(AgeDescriptor::Range { min: 3, .. })));
        assert!(matches!(
            session.select_bucket("うちゅう"),
            Err(IntakeError::UnknownAgeBucket(_))
        ));
    }

    #[test]
    fn custom_symptom_can_be_toggled_back() {
        let mut session = IntakeSession::new();
        let symptom = session.add_custom(CustomSymptomInput::named("ひざがいたい")).unwrap();

        let toggled = session.toggle_symptom(&symptom.key, SymptomCategory::Custom).unwrap();
        assert_eq!(toggled, Toggle::Removed);
        let toggled = session.toggle_symptom(&symptom.key, SymptomCategory::Custom).unwrap();
        assert_eq!(toggled, Toggle::Added);
        assert_eq!(session.snapshot().symptoms[0].display_name, "ひざがいたい");
    }

    #[test]
    fn abandoned_analysis_returns_to_idle() {
        let mut session = ready_session();
        let pending = session.begin_analysis().unwrap();
        session.abandon_analysis(pending.ticket);
        assert!(!session.is_analyzing());
        assert_eq!(session.state(), &AnalysisState::Idle);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let session = ready_session();
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["analyzing"], false);
        assert_eq!(json["age"]["kind"], "exact");
        assert_eq!(json["symptoms"][0]["key"], "fever");
        assert!(json["result"].is_null());
        assert!(json.get("sessionId").is_some());
    }
}
