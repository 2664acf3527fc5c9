//! MetricsSink port - fire-and-forget counters and timings.
//!
//! Recording never fails and never blocks the caller on I/O.

use std::time::Duration;

use crate::domain::foundation::{ProjectId, TimeWindow};

pub trait MetricsSink: Send + Sync {
    /// Latency of one outbound attempt, keyed by operation name.
    fn record_latency(&self, operation: &str, elapsed: Duration);

    /// One finalized submission.
    fn record_submission(&self, project_id: &ProjectId, window: TimeWindow);
}
