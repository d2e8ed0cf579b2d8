//! Model client trait and a scripted mock for tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, ShopmateError};
use crate::llm::types::{CompletionRequest, CompletionResponse};

/// Stateless model client - each call carries the full conversation
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single completion request (blocking until complete)
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;

    /// Model identifier used for requests
    fn model(&self) -> &str;
}

/// Mock client that replays queued responses and records every request.
///
/// Returns an `Upstream` error once the queue is exhausted.
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<CompletionResponse>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmClient {
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue an error as the next response
    pub fn push_error(&self, error: ShopmateError) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(Err(error));
        }
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let next = self
            .responses
            .lock()
            .map_err(|e| ShopmateError::Upstream(format!("mock poisoned: {}", e)))?
            .pop_front();
        next.unwrap_or_else(|| Err(ShopmateError::Upstream("mock has no more responses".to_string())))
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
