/*!
 * Mock generator implementations for testing.
 *
 * This module provides a mock generator that simulates different behaviors:
 * - `MockGenerator::working()` - Always succeeds with an echo of the prompt
 * - `MockGenerator::flaky(n)` - Fails the first `n` calls, then succeeds
 * - `MockGenerator::failing()` - Always fails with a transient error
 *
 * Every call is recorded so tests can assert on call counts and prompts.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{GenerationRequest, TextGenerator};

/// Custom response function
pub type Responder = Arc<dyn Fn(&GenerationRequest) -> Result<String, ProviderError> + Send + Sync>;

/// Behavior mode for the mock generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails the first `failures` calls with a transient error
    Flaky { failures: usize },
    /// Always fails with a transient error
    Failing,
    /// Always fails with a non-transient error
    Rejecting,
    /// Returns an empty response
    Empty,
}

/// Mock generator for testing translation behavior
#[derive(Clone)]
pub struct MockGenerator {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    /// Custom response generator (optional)
    responder: Option<Responder>,
}

impl fmt::Debug for MockGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockGenerator")
            .field("behavior", &self.behavior)
            .field("calls", &self.call_count())
            .finish()
    }
}

impl MockGenerator {
    /// Create a new mock generator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            responder: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn flaky(failures: usize) -> Self {
        Self::new(MockBehavior::Flaky { failures })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn rejecting() -> Self {
        Self::new(MockBehavior::Rejecting)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Set a custom response generator used when the call succeeds
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&GenerationRequest) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        self.responder = Some(Arc::new(responder));
        self
    }

    /// Number of `generate` calls so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    fn succeed(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        match &self.responder {
            Some(responder) => responder(request),
            None => Ok(format!("[GENERATED] {}", request.user)),
        }
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Working => self.succeed(request),
            MockBehavior::Flaky { failures } if count < failures => Err(ProviderError::ConnectionError(
                format!("Simulated connection drop on call {}", count + 1),
            )),
            MockBehavior::Flaky { .. } => self.succeed(request),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 503,
                message: "Simulated service unavailable".to_string(),
            }),
            MockBehavior::Rejecting => Err(ProviderError::ApiError {
                status_code: 400,
                message: "Simulated bad request".to_string(),
            }),
            MockBehavior::Empty => Err(ProviderError::EmptyResponse),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
