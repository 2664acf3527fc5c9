//! Mock transport for tests and offline runs.
//!
//! Responses and errors are queued and consumed in order. Every request is
//! recorded before the optional delay, so timed-out calls still count.
//!
//! ```ignore
//! let transport = MockTransport::new()
//!     .with_error(TransportError::RateLimited)
//!     .with_response(r#"{"project_id":"payments","confidence":"high"}"#);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    ExtractionTransport, RawModelResponse, TokenUsage, TransportError, TransportRequest,
};

#[derive(Debug, Clone)]
pub enum MockReply {
    Content(String),
    Error(TransportError),
}

#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<Mutex<Vec<TransportRequest>>>,
    delay: Duration,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues raw model content.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        guard(&self.replies).push_back(MockReply::Content(content.into()));
        self
    }

    /// Queues a JSON value as model content.
    pub fn with_json(self, value: serde_json::Value) -> Self {
        self.with_response(value.to_string())
    }

    pub fn with_error(self, error: TransportError) -> Self {
        guard(&self.replies).push_back(MockReply::Error(error));
        self
    }

    /// Simulated latency for every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queues a reply on an already shared mock.
    pub fn push(&self, reply: MockReply) {
        guard(&self.replies).push_back(reply);
    }

    pub fn call_count(&self) -> usize {
        guard(&self.calls).len()
    }

    pub fn calls(&self) -> Vec<TransportRequest> {
        guard(&self.calls).clone()
    }

    /// Operation names of recorded calls, in order.
    pub fn operations(&self) -> Vec<String> {
        guard(&self.calls).iter().map(|c| c.operation.clone()).collect()
    }

    pub fn remaining(&self) -> usize {
        guard(&self.replies).len()
    }
}

#[async_trait]
impl ExtractionTransport for MockTransport {
    async fn execute(&self, request: &TransportRequest) -> Result<RawModelResponse, TransportError> {
        guard(&self.calls).push(request.clone());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let reply = guard(&self.replies).pop_front();
        match reply {
            Some(MockReply::Content(content)) => Ok(RawModelResponse {
                content: Some(content),
                model: "mock-model".to_string(),
                usage: Some(TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 20,
                }),
            }),
            Some(MockReply::Error(err)) => Err(err),
            None => Err(TransportError::invalid_response("no mock reply queued")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_are_consumed_in_order() {
        let mock = MockTransport::new()
            .with_response("first")
            .with_error(TransportError::RateLimited);
        let request = TransportRequest::new("op", "sys");

        let first = mock.execute(&request).await.unwrap();
        let second = mock.execute(&request).await;
        let third = mock.execute(&request).await;

        assert_eq!(first.content.as_deref(), Some("first"));
        assert_eq!(second.unwrap_err(), TransportError::RateLimited);
        assert!(matches!(third, Err(TransportError::InvalidResponse(_))));
        assert_eq!(mock.call_count(), 3);
        assert_eq!(mock.operations(), vec!["op", "op", "op"]);
    }

    #[tokio::test]
    async fn shared_clones_see_the_same_queue() {
        let mock = MockTransport::new();
        let handle = mock.clone();
        handle.push(MockReply::Content("{}".into()));

        assert_eq!(mock.remaining(), 1);
        mock.execute(&TransportRequest::new("op", "")).await.unwrap();
        assert_eq!(handle.call_count(), 1);
    }
}
