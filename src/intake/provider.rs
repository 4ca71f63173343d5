use std::collections::VecDeque;
use std::sync::Mutex;

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::models::DiagnosisResult;

/// Errors from the text-completion transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider credentials are not configured")]
    MissingCredentials,

    #[error("Cannot reach provider: {0}")]
    Connection(String),

    #[error("Provider request timed out after {0}s")]
    Timeout(u64),

    #[error("Provider HTTP error: {0}")]
    Http(String),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected provider response shape: {0}")]
    UnexpectedShape(String),

    #[error("Cannot sign provider request: {0}")]
    Signing(String),
}

impl ProviderError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout(_) | Self::Http(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::MissingCredentials | Self::UnexpectedShape(_) | Self::Signing(_) => false,
        }
    }
}

/// Remote text-completion service: prompt in, raw text out.
pub trait AnalysisProvider: Send + Sync {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, ProviderError>>;

    fn name(&self) -> &str {
        "provider"
    }
}

/// What one provider attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    Parsed(DiagnosisResult),
    /// Text came back but did not hold a usable result.
    Malformed(String),
    TransportFailure(ProviderError),
}

impl ProviderOutcome {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Parsed(_) => false,
            Self::Malformed(_) => true,
            Self::TransportFailure(err) => err.is_retryable(),
        }
    }
}

/// Scripted provider for tests and offline runs.
///
/// Replies are consumed in order; the last one repeats once the script runs out.
pub struct MockProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    last: Mutex<Option<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn failing(err: ProviderError) -> Self {
        Self::new(vec![Err(err)])
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn next_reply(&self) -> Result<String, ProviderError> {
        let poisoned = || Err(ProviderError::Connection("mock lock poisoned".into()));
        let Ok(mut script) = self.script.lock() else {
            return poisoned();
        };
        let Ok(mut last) = self.last.lock() else {
            return poisoned();
        };
        if let Some(reply) = script.pop_front() {
            *last = Some(reply.clone());
            return reply;
        }
        last.clone()
            .unwrap_or_else(|| Err(ProviderError::Connection("mock script is empty".into())))
    }
}

impl AnalysisProvider for MockProvider {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            if let Ok(mut prompts) = self.prompts.lock() {
                prompts.push(prompt.to_string());
            }
            self.next_reply()
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(ProviderError::Timeout(30).is_retryable());
        assert!(ProviderError::Connection("refused".into()).is_retryable());
        assert!(ProviderError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(ProviderError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(!ProviderError::Status { status: 403, body: String::new() }.is_retryable());
        assert!(!ProviderError::MissingCredentials.is_retryable());
    }

    #[test]
    fn outcome_retry_rules() {
        assert!(ProviderOutcome::Malformed("oops".into()).is_retryable());
        assert!(!ProviderOutcome::TransportFailure(ProviderError::MissingCredentials).is_retryable());
    }

    #[tokio::test]
    async fn mock_replays_script_then_repeats_last() {
        let mock = MockProvider::new(vec![
            Err(ProviderError::Timeout(1)),
            Ok("second".into()),
        ]);
        assert_eq!(mock.complete("a").await, Err(ProviderError::Timeout(1)));
        assert_eq!(mock.complete("b").await.unwrap(), "second");
        assert_eq!(mock.complete("c").await.unwrap(), "second");
        assert_eq!(mock.calls(), 3);
        assert_eq!(mock.prompts(), vec!["a", "b", "c"]);
    }
}
