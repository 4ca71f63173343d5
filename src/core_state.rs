//! Shared application state behind the HTTP API.
//!
//! Holds every open intake session plus the analysis invoker and the
//! optional places client. Session locks are short-lived and never held
//! while the provider is being awaited.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use uuid::Uuid;

use crate::intake::{AnalysisInvoker, AnalysisTicket, IntakeError, IntakeSession};
use crate::models::DiagnosisResult;
use crate::places::PlacesLookup;

/// Sessions untouched for this long are dropped by the sweeper.
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 60 * 60;

type SessionHandle = Arc<Mutex<IntakeSession>>;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
    invoker: Arc<AnalysisInvoker>,
    places: Option<Arc<dyn PlacesLookup>>,
}

impl CoreState {
    pub fn new(invoker: Arc<AnalysisInvoker>, places: Option<Arc<dyn PlacesLookup>>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            invoker,
            places,
        }
    }

    pub fn places(&self) -> Option<Arc<dyn PlacesLookup>> {
        self.places.clone()
    }

    // ── Session registry ────────────────────────────────────

    pub fn create_session(&self) -> Result<Uuid, CoreError> {
        let session = IntakeSession::new();
        let id = session.id();
        self.sessions
            .write()
            .map_err(|_| CoreError::LockPoisoned)?
            .insert(id, Arc::new(Mutex::new(session)));
        tracing::info!(session_id = %id, "Intake session created");
        Ok(id)
    }

    pub fn session(&self, id: Uuid) -> Result<SessionHandle, CoreError> {
        self.sessions
            .read()
            .map_err(|_| CoreError::LockPoisoned)?
            .get(&id)
            .cloned()
            .ok_or(CoreError::UnknownSession(id))
    }

    /// Run `f` against one session under its lock.
    pub fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut IntakeSession) -> R,
    ) -> Result<R, CoreError> {
        let handle = self.session(id)?;
        let mut session = handle.lock().map_err(|_| CoreError::LockPoisoned)?;
        session.touch();
        Ok(f(&mut session))
    }

    pub fn remove_session(&self, id: Uuid) -> Result<bool, CoreError> {
        let removed = self
            .sessions
            .write()
            .map_err(|_| CoreError::LockPoisoned)?
            .remove(&id)
            .is_some();
        if removed {
            tracing::info!(session_id = %id, "Intake session closed");
        }
        Ok(removed)
    }

    pub fn session_count(&self) -> Result<usize, CoreError> {
        Ok(self.sessions.read().map_err(|_| CoreError::LockPoisoned)?.len())
    }

    /// Drop sessions idle for longer than `max_idle`. Sessions with an
    /// analysis in flight are kept.
    pub fn evict_idle(&self, max_idle: Duration) -> Result<usize, CoreError> {
        let mut sessions = self.sessions.write().map_err(|_| CoreError::LockPoisoned)?;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.lock() {
            Ok(session) => session.is_analyzing() || session.idle_for() < max_idle,
            Err(_) => false,
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Evicted idle intake sessions");
        }
        Ok(evicted)
    }

    // ── Analysis ────────────────────────────────────────────

    /// Analyze the session's current selection.
    ///
    /// `Ok(None)` means the session was reset while the provider was
    /// working and the result was discarded.
    pub async fn analyze(&self, id: Uuid) -> Result<Option<DiagnosisResult>, CoreError> {
        let handle = self.session(id)?;
        let pending = {
            let mut session = handle.lock().map_err(|_| CoreError::LockPoisoned)?;
            session.touch();
            session.begin_analysis()?
        };

        tracing::info!(
            session_id = %id,
            request_id = pending.ticket.request_id,
            symptoms = pending.symptoms.len(),
            "Analysis started"
        );
        let mut in_flight = InFlightGuard {
            handle: handle.clone(),
            ticket: pending.ticket,
            armed: true,
        };
        let analysis = self
            .invoker
            .analyze(&pending.symptoms, Some(&pending.age))
            .await;

        let mut session = handle.lock().map_err(|_| CoreError::LockPoisoned)?;
        in_flight.armed = false;
        let Some(analysis) = analysis else {
            session.abandon_analysis(pending.ticket);
            return Ok(None);
        };

        let kind = analysis.kind;
        let result = analysis.result.clone();
        if session.complete_analysis(pending.ticket, analysis) {
            tracing::info!(session_id = %id, kind = ?kind, "Analysis applied");
            Ok(Some(result))
        } else {
            Ok(None)
        }
    }
}

/// Releases the session's in-flight marker if `analyze` is dropped while
/// the provider call is pending (e.g. the HTTP client disconnected).
struct InFlightGuard {
    handle: SessionHandle,
    ticket: AnalysisTicket,
    armed: bool,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Ok(mut session) = self.handle.lock() {
            session.abandon_analysis(self.ticket);
            tracing::info!(
                session_id = %session.id(),
                request_id = self.ticket.request_id,
                "Analysis cancelled before completion"
            );
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown intake session: {0}")]
    UnknownSession(Uuid),
    #[error("Internal lock error")]
    LockPoisoned,
    #[error(transparent)]
    Intake(#[from] IntakeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::{AnalysisProvider, MockProvider, ProviderError};
    use crate::models::SymptomCategory;
    use futures_util::future::BoxFuture;
    use tokio::sync::Notify;

    const VALID_RESPONSE: &str = r#"{"recommendedDepartment":"小児科","alternativeDepartments":["内科"],"urgencyLevel":2,"recommendations":["休む"]}"#;

    fn state_with(provider: Arc<dyn AnalysisProvider>) -> Arc<CoreState> {
        Arc::new(CoreState::new(Arc::new(AnalysisInvoker::new(provider, 0)), None))
    }

    fn prepare(state: &CoreState) -> Uuid {
        let id = state.create_session().unwrap();
        state
            .with_session(id, |s| {
                s.select_exact("6").unwrap();
                s.toggle_symptom("fever", SymptomCategory::General).unwrap();
            })
            .unwrap();
        id
    }

    /// Blocks inside the provider call until released.
    struct GatedProvider {
        started: Notify,
        release: Notify,
    }

    impl AnalysisProvider for GatedProvider {
        fn complete<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String, ProviderError>> {
            Box::pin(async move {
                self.started.notify_one();
                self.release.notified().await;
                Ok(VALID_RESPONSE.to_string())
            })
        }
    }

    #[tokio::test]
    async fn analyze_stores_result() {
        let state = state_with(Arc::new(MockProvider::replying(VALID_RESPONSE)));
        let id = prepare(&state);

        let result = state.analyze(id).await.unwrap().unwrap();
        assert_eq!(result.recommended_department, "小児科");

        let snapshot = state.with_session(id, |s| s.snapshot()).unwrap();
        assert_eq!(snapshot.result, Some(result));
        assert!(!snapshot.analyzing);
    }

    #[tokio::test]
    async fn analyze_guards_preconditions() {
        let state = state_with(Arc::new(MockProvider::replying(VALID_RESPONSE)));
        let id = state.create_session().unwrap();
        assert!(matches!(
            state.analyze(id).await,
            Err(CoreError::Intake(IntakeError::EmptySelection))
        ));
        assert!(matches!(
            state.analyze(Uuid::new_v4()).await,
            Err(CoreError::UnknownSession(_))
        ));
    }

    #[tokio::test]
    async fn reset_during_analysis_discards_result() {
        let provider = Arc::new(GatedProvider {
            started: Notify::new(),
            release: Notify::new(),
        });
        let state = state_with(provider.clone());
        let id = prepare(&state);

        let task = tokio::spawn({
            let state = state.clone();
            async move { state.analyze(id).await }
        });
        provider.started.notified().await;

        assert!(matches!(
            state.analyze(id).await,
            Err(CoreError::Intake(IntakeError::AnalysisInProgress))
        ));

        state.with_session(id, |s| s.reset()).unwrap();
        provider.release.notify_one();

        let outcome = task.await.unwrap().unwrap();
        assert!(outcome.is_none());
        let snapshot = state.with_session(id, |s| s.snapshot()).unwrap();
        assert!(!snapshot.analyzing);
        assert!(snapshot.result.is_none());
        assert!(snapshot.symptoms.is_empty());
    }

    /// Never answers; signals once the call has started.
    struct StalledProvider {
        started: Notify,
    }

    impl AnalysisProvider for StalledProvider {
        fn complete<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String, ProviderError>> {
            Box::pin(async move {
                self.started.notify_one();
                futures_util::future::pending::<()>().await;
                Ok(VALID_RESPONSE.to_string())
            })
        }
    }

    #[tokio::test]
    async fn dropped_analysis_releases_in_flight_marker() {
        let provider = Arc::new(StalledProvider {
            started: Notify::new(),
        });
        let state = state_with(provider.clone());
        let id = prepare(&state);

        let task = tokio::spawn({
            let state = state.clone();
            async move { state.analyze(id).await }
        });
        provider.started.notified().await;
        assert!(state.with_session(id, |s| s.is_analyzing()).unwrap());

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        let snapshot = state.with_session(id, |s| s.snapshot()).unwrap();
        assert!(!snapshot.analyzing);
        assert!(snapshot.result.is_none());

        let ticket = state
            .with_session(id, |s| s.begin_analysis().map(|p| p.ticket))
            .unwrap()
            .unwrap();
        state.with_session(id, |s| s.abandon_analysis(ticket)).unwrap();
        assert_eq!(state.evict_idle(Duration::ZERO).unwrap(), 1);
    }

    #[test]
    fn remove_and_evict_sessions() {
        let state = state_with(Arc::new(MockProvider::replying(VALID_RESPONSE)));
        let a = state.create_session().unwrap();
        let _b = state.create_session().unwrap();
        assert_eq!(state.session_count().unwrap(), 2);

        assert!(state.remove_session(a).unwrap());
        assert!(!state.remove_session(a).unwrap());
        assert!(matches!(state.session(a), Err(CoreError::UnknownSession(_))));

        assert_eq!(state.evict_idle(Duration::from_secs(3600)).unwrap(), 0);
        assert_eq!(state.evict_idle(Duration::ZERO).unwrap(), 1);
        assert_eq!(state.session_count().unwrap(), 0);
    }
}
