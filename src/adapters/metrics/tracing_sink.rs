//! Metrics sink that only emits structured log events.

use std::time::Duration;
use tracing::{debug, info};

use crate::domain::foundation::{ProjectId, TimeWindow};
use crate::ports::MetricsSink;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetrics;

impl MetricsSink for TracingMetrics {
    fn record_latency(&self, operation: &str, elapsed: Duration) {
        debug!(
            operation,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "latency recorded"
        );
    }

    fn record_submission(&self, project_id: &ProjectId, window: TimeWindow) {
        info!(project_id = %project_id, window = %window, "submission recorded");
    }
}
