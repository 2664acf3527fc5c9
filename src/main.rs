//! QA Pulse development harness
//!
//! Reads chat lines from stdin and drives one submission conversation at a
//! time. `/report YYYY-MM` prints that month's report as JSON.

use std::error::Error;
use std::str::FromStr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use qa_pulse::adapters::ai::{OpenAiTransport, RetryingTransport};
use qa_pulse::adapters::extraction::LlmStructuredExtractor;
use qa_pulse::adapters::metrics::TracingMetrics;
use qa_pulse::adapters::publishing::JsonFilePublisher;
use qa_pulse::adapters::registry::{load_registry, StaticProjectRegistry};
use qa_pulse::adapters::sources::{ConfiguredRegressionTimes, ManualReleaseCalendar, MockIssueTracker};
use qa_pulse::adapters::storage::FileSubmissionRepository;
use qa_pulse::adapters::SystemClock;
use qa_pulse::application::{
    ConversationReply, ConversationStateMachine, ReportAggregationEngine, ReportDashboard,
    SubmissionFinalizer,
};
use qa_pulse::config::{AppConfig, LogFormat, LoggingConfig, ValidationError};
use qa_pulse::domain::conversation::{ConversationSession, FollowUp};
use qa_pulse::domain::foundation::{DomainError, TimeWindow};
use qa_pulse::ports::MetricsSink;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn begin(machine: &ConversationStateMachine) -> ConversationSession {
    let mut session = ConversationSession::new();
    println!("{}", machine.start(&mut session).text);
    session
}

async fn print_report(engine: &ReportAggregationEngine, period: &str) {
    let window = match TimeWindow::from_str(period) {
        Ok(window) => window,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };
    let (report, status) = engine.generate(window).await;
    let document = serde_json::json!({ "completeness": status, "report": report });
    match serde_json::to_string_pretty(&document) {
        Ok(body) => println!("{}", body),
        Err(e) => warn!(error = %e, "report encoding failed"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load_validated()?;
    init_tracing(&config.logging);

    let settings = config.reporting.settings()?;
    let offset = config
        .reporting
        .offset()
        .ok_or(ValidationError::InvalidUtcOffset)?;
    let clock = Arc::new(SystemClock::new(offset));
    let metrics: Arc<dyn MetricsSink> = Arc::new(TracingMetrics);

    let registry = Arc::new(match &config.reporting.registry_path {
        Some(path) => load_registry(path)?,
        None => StaticProjectRegistry::default_registry(),
    });
    let regressions = Arc::new(match &config.reporting.regression_suites_path {
        Some(path) => ConfiguredRegressionTimes::load(path)?,
        None => ConfiguredRegressionTimes::new(),
    });
    let repository = Arc::new(FileSubmissionRepository::new(config.reporting.submissions_dir()));

    let engine = Arc::new(ReportAggregationEngine::new(
        registry.clone(),
        repository.clone(),
        Arc::new(MockIssueTracker::new()),
        Arc::new(ManualReleaseCalendar::new()),
        regressions,
        clock.clone(),
        settings,
    ));
    let dashboard = Arc::new(ReportDashboard::new(
        engine.clone(),
        Arc::new(JsonFilePublisher::new(config.reporting.reports_dir())),
    ));
    let finalizer = SubmissionFinalizer::new(
        repository,
        registry.clone(),
        dashboard,
        metrics.clone(),
        clock.clone(),
    );

    let transport = Arc::new(RetryingTransport::new(
        Arc::new(OpenAiTransport::new(config.ai.transport_config())?),
        config.ai.retry_policy(),
        metrics,
    ));
    let machine = ConversationStateMachine::new(
        Arc::new(LlmStructuredExtractor::new(transport)),
        registry,
        clock,
        config.conversation.policy(),
    );

    info!(model = %config.ai.model, base_url = %config.ai.base_url, "qa-pulse ready");

    let mut session = begin(&machine);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(period) = line.trim().strip_prefix("/report") {
            print_report(&engine, period.trim()).await;
            continue;
        }

        match machine.handle_message(&mut session, &line).await {
            Ok(ConversationReply::Prompt(prompt)) => println!("{}", prompt.text),
            Ok(ConversationReply::Submission(command)) => match finalizer.execute(command).await {
                Ok(receipt) => {
                    let saved = &receipt.submission;
                    println!("{}", FollowUp::saved(&saved.project_id, saved.window).text);
                    for warning in &receipt.warnings {
                        println!("{}", warning.message());
                    }
                }
                Err(e) => {
                    let err = DomainError::from(e);
                    warn!(code = %err.code, error = %err.message, "submission rejected");
                    println!("{}", err.message);
                }
            },
            Err(e) => {
                let err = DomainError::from(e);
                warn!(code = %err.code, details = ?err.details, "conversation failed");
                println!("{}", err.message);
            }
        }

        if session.is_closed() {
            session = begin(&machine);
        }
    }

    Ok(())
}
