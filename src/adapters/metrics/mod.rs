//! Metrics sink adapters.

mod in_memory;
mod tracing_sink;

pub use in_memory::{InMemoryMetrics, MetricsSnapshot};
pub use tracing_sink::TracingMetrics;
