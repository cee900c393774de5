//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent
///
/// Implementations make exactly one outbound request per call and never retry
/// internally; retry policy belongs to the caller.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Model identifier, for logging
    fn model(&self) -> &str;
}

/// Mock LLM clients for tests
///
/// Outside this crate's unit tests, enable the `test-util` feature.
#[cfg(any(test, feature = "test-util"))]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;
    use tracing::debug;

    /// Scripted mock client
    ///
    /// Returns queued results in order; once the queue is drained every call
    /// fails with `Malformed`. An optional gate holds each call until a
    /// permit is released, which lets tests observe a generation mid-flight.
    pub struct MockLlmClient {
        results: Mutex<VecDeque<Result<CompletionResponse, LlmError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
        call_count: AtomicUsize,
        gate: Option<std::sync::Arc<Semaphore>>,
    }

    impl MockLlmClient {
        pub fn new(results: Vec<Result<CompletionResponse, LlmError>>) -> Self {
            debug!(result_count = %results.len(), "MockLlmClient::new: called");
            Self {
                results: Mutex::new(results.into()),
                requests: Mutex::new(Vec::new()),
                call_count: AtomicUsize::new(0),
                gate: None,
            }
        }

        /// Client that answers every queued call with the given texts
        pub fn with_texts<I, S>(texts: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self::new(texts.into_iter().map(|t| Ok(CompletionResponse::text(t))).collect())
        }

        /// Hold every call until a permit is added to `gate`
        pub fn gated(mut self, gate: std::sync::Arc<Semaphore>) -> Self {
            self.gate = Some(gate);
            self
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Requests received so far, oldest first
        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().map(|r| r.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            debug!(%idx, "MockLlmClient::complete: called");
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request);
            }

            if let Some(gate) = &self.gate {
                debug!("MockLlmClient::complete: waiting on gate");
                let permit = gate
                    .acquire()
                    .await
                    .map_err(|_| LlmError::Malformed("Gate closed".to_string()))?;
                permit.forget();
            }

            let next = self.results.lock().ok().and_then(|mut r| r.pop_front());
            next.unwrap_or_else(|| {
                debug!("MockLlmClient::complete: no more mock responses");
                Err(LlmError::Malformed("No more mock responses".to_string()))
            })
        }

        fn model(&self) -> &str {
            "mock"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::sync::Arc;

        #[tokio::test]
        async fn test_mock_client_returns_responses() {
            let client = MockLlmClient::with_texts(["Response 1", "Response 2"]);
            let req = CompletionRequest::single("Test", 1000);

            let resp1 = client.complete(req.clone()).await.unwrap();
            assert_eq!(resp1.content, Some("Response 1".to_string()));

            let resp2 = client.complete(req).await.unwrap();
            assert_eq!(resp2.content, Some("Response 2".to_string()));

            assert_eq!(client.call_count(), 2);
            assert_eq!(client.requests().len(), 2);
        }

        #[tokio::test]
        async fn test_mock_client_errors_when_exhausted() {
            let client = MockLlmClient::new(vec![]);
            let result = client.complete(CompletionRequest::single("Test", 1000)).await;
            assert!(result.is_err());
        }

        #[tokio::test]
        async fn test_mock_client_gate_holds_call() {
            let gate = Arc::new(Semaphore::new(0));
            let client = Arc::new(MockLlmClient::with_texts(["late"]).gated(gate.clone()));

            let task = {
                let client = client.clone();
                tokio::spawn(async move { client.complete(CompletionRequest::single("x", 10)).await })
            };
            tokio::task::yield_now().await;
            assert!(!task.is_finished());

            gate.add_permits(1);
            let resp = task.await.unwrap().unwrap();
            assert_eq!(resp.content.as_deref(), Some("late"));
        }
    }
}
