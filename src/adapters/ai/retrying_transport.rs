//! Retrying transport - decorator that bounds each attempt with a timeout
//! and repeats transient failures with exponential backoff.
//!
//! Non-transient errors (auth, 4xx, undecodable bodies) return on the first
//! attempt. Every attempt's latency is reported to the metrics sink.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::ports::{
    ExtractionTransport, MetricsSink, RawModelResponse, TransportError, TransportRequest,
};

/// Attempt budget and backoff shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub per_attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            per_attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_per_attempt_timeout(mut self, limit: Duration) -> Self {
        self.per_attempt_timeout = limit;
        self
    }

    /// Sleep before retry number `retry` (0-based): base * 2^retry, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

pub struct RetryingTransport {
    inner: Arc<dyn ExtractionTransport>,
    policy: RetryPolicy,
    metrics: Arc<dyn MetricsSink>,
}

impl RetryingTransport {
    pub fn new(
        inner: Arc<dyn ExtractionTransport>,
        policy: RetryPolicy,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            inner,
            policy,
            metrics,
        }
    }

    async fn attempt(&self, request: &TransportRequest) -> Result<RawModelResponse, TransportError> {
        let started = Instant::now();
        let outcome = match timeout(self.policy.per_attempt_timeout, self.inner.execute(request)).await
        {
            Ok(result) => result,
            Err(_) => Err(TransportError::timeout(self.policy.per_attempt_timeout)),
        };
        self.metrics.record_latency(&request.operation, started.elapsed());
        outcome
    }
}

#[async_trait]
impl ExtractionTransport for RetryingTransport {
    async fn execute(&self, request: &TransportRequest) -> Result<RawModelResponse, TransportError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.attempt(request).await {
                Ok(response) => {
                    if attempt > 1 {
                        debug!(operation = %request.operation, attempt, "succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let backoff = self.policy.delay_for(attempt - 1);
                    warn!(
                        operation = %request.operation,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "transient transport failure, retrying"
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(
                        operation = %request.operation,
                        attempt,
                        error = %err,
                        "transport failed"
                    );
                    return Err(err);
                }
            }
        }
    }
}
