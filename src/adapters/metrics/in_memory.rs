//! Process-local counters, readable in tests and from the CLI.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::info;

use crate::domain::foundation::{ProjectId, TimeWindow, Timestamp};
use crate::ports::MetricsSink;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub submissions: u64,
    pub last_submission_at: Option<Timestamp>,
    /// Most recent latency per operation, in milliseconds.
    pub latest_latency_ms: HashMap<String, f64>,
}

#[derive(Debug, Default)]
struct State {
    submissions: u64,
    last_submission_at: Option<Timestamp>,
    latencies: HashMap<String, Vec<Duration>>,
}

#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    state: Mutex<State>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn submissions(&self) -> u64 {
        self.state().submissions
    }

    /// Every recorded latency for an operation, oldest first.
    pub fn latencies(&self, operation: &str) -> Vec<Duration> {
        self.state()
            .latencies
            .get(operation)
            .cloned()
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let state = self.state();
        MetricsSnapshot {
            submissions: state.submissions,
            last_submission_at: state.last_submission_at,
            latest_latency_ms: state
                .latencies
                .iter()
                .filter_map(|(op, samples)| {
                    samples
                        .last()
                        .map(|d| (op.clone(), d.as_secs_f64() * 1000.0))
                })
                .collect(),
        }
    }
}

impl MetricsSink for InMemoryMetrics {
    fn record_latency(&self, operation: &str, elapsed: Duration) {
        self.state()
            .latencies
            .entry(operation.to_string())
            .or_default()
            .push(elapsed);
    }

    fn record_submission(&self, project_id: &ProjectId, window: TimeWindow) {
        let count = {
            let mut state = self.state();
            state.submissions += 1;
            state.last_submission_at = Some(Timestamp::now());
            state.submissions
        };
        info!(
            project_id = %project_id,
            window = %window,
            submission_count = count,
            "submission recorded"
        );
    }
}
