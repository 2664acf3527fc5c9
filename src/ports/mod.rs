//! Ports - Interfaces for external dependencies.
//!
//! Adapters implement these; application handlers depend only on them.
//!
//! ## Extraction
//!
//! - `ExtractionTransport` - one structured-completion call to a model
//! - `StructuredExtractor` - typed candidates from free text
//!
//! ## Data
//!
//! - `ProjectRegistry` - known projects and streams
//! - `SubmissionRepository` - finalized coverage submissions
//! - `IssueTracker`, `ReleaseCalendar`, `RegressionTimeSource` - quality data
//!
//! ## Output
//!
//! - `DashboardRegenerator`, `ReportPublisher` - dashboard refresh
//! - `MetricsSink` - latency and submission counters
//! - `Clock` - current time in the reporting timezone

mod clock;
mod dashboard;
mod extraction_transport;
mod metrics_sink;
mod project_registry;
mod quality_sources;
mod structured_extractor;
mod submission_repository;

pub use clock::Clock;
pub use dashboard::{DashboardError, DashboardRegenerator, PublishError, ReportPublisher};
pub use extraction_transport::{
    ChatMessage, ChatRole, ExtractionTransport, RawModelResponse, TokenUsage, TransportError,
    TransportRequest,
};
pub use metrics_sink::MetricsSink;
pub use project_registry::ProjectRegistry;
pub use quality_sources::{IssueTracker, RegressionTimeSource, ReleaseCalendar, SourceError};
pub use structured_extractor::{
    AmbiguityKind, ExtractionError, HistoryExtractionRequest, PeriodCandidate, PeriodStatement,
    ProjectCandidate, CoverageCandidate, StructuredExtractor,
};
pub use submission_repository::{StorageError, SubmissionRepository};
