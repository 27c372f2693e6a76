/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with translated text
 * - `MockProvider::failing()` - Always fails with a retryable server error
 * - `MockProvider::failing_on(..)` - Fails only for texts containing a marker
 * - `MockProvider::flaky(n)` - Fails the first `n` calls, then succeeds
 * - `MockProvider::empty()` - Answers with an empty completion
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{ChatRequest, ChatResponse, Provider};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Always fails with a server error (retryable)
    Failing,
    /// Always fails with a malformed response (not retryable)
    Malformed,
    /// Fails with a server error whenever the text contains the marker
    FailingOn { marker: &'static str },
    /// Fails with a connection error for the first `failures` calls
    Flaky { failures: usize },
    /// Returns an empty completion
    Empty,
    /// Succeeds after sleeping, to observe concurrency
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter
    request_count: Arc<AtomicUsize>,
    /// Calls currently inside `complete`
    in_flight: Arc<AtomicUsize>,
    /// Highest observed value of `in_flight`
    peak_in_flight: Arc<AtomicUsize>,
    /// User texts seen, in call order
    seen: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed)
    }

    pub fn failing_on(marker: &'static str) -> Self {
        Self::new(MockBehavior::FailingOn { marker })
    }

    pub fn flaky(failures: usize) -> Self {
        Self::new(MockBehavior::Flaky { failures })
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Total number of `complete` calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous `complete` calls observed
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// User texts received so far
    pub fn seen_texts(&self) -> Vec<String> {
        self.seen.lock().clone()
    }

    /// Default rendering used by `Working` mode
    pub fn translate_text(text: &str) -> String {
        format!("[TR] {}", text)
    }

    async fn respond(&self, count: usize, text: &str) -> Result<ChatResponse, ProviderError> {
        let ok = |text: String| Ok(ChatResponse {
            prompt_tokens: Some(10),
            completion_tokens: Some(text.chars().count() as u64),
            text,
        });

        match self.behavior {
            MockBehavior::Working => ok(Self::translate_text(text)),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),

            MockBehavior::Malformed => Err(ProviderError::ParseError(
                "Simulated malformed response".to_string(),
            )),

            MockBehavior::FailingOn { marker } => {
                if text.contains(marker) {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated failure for request #{}", count + 1),
                    })
                } else {
                    ok(Self::translate_text(text))
                }
            }

            MockBehavior::Flaky { failures } => {
                if count < failures {
                    Err(ProviderError::ConnectionError(format!(
                        "Simulated connection reset (request #{})",
                        count + 1
                    )))
                } else {
                    ok(Self::translate_text(text))
                }
            }

            MockBehavior::Empty => ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                ok(Self::translate_text(text))
            }
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            in_flight: Arc::clone(&self.in_flight),
            peak_in_flight: Arc::clone(&self.peak_in_flight),
            seen: Arc::clone(&self.seen),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let text = request.user_text().to_string();
        self.seen.lock().push(text.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = self.respond(count, &text).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
