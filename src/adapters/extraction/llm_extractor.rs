//! Model-backed structured extractor.
//!
//! Each field is one transport call with its own prompt and schema. Model
//! content goes through fence cleanup, then serde; anything that does not
//! fit the payload shape is an `LlmExtraction` error, and readable answers
//! that name nothing usable are `Ambiguous`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::prompts::{self, COVERAGE_PROMPT, PERIOD_PROMPT, SYSTEM_PROMPT};
use super::sanitizer::{extract_json_object, payload_preview};
use super::schemas::{
    coverage_schema, period_schema, project_schema, CoveragePayload, PeriodKind, PeriodPayload,
    ProjectPayload,
};
use crate::domain::conversation::SubmissionField;
use crate::domain::foundation::{ProjectId, TimeWindow};
use crate::domain::submission::{ExtractionConfidence, MAX_TEST_CASES};
use crate::ports::{
    ChatMessage, CoverageCandidate, ExtractionError, ExtractionTransport, PeriodCandidate,
    PeriodStatement, ProjectCandidate, ProjectRegistry, StructuredExtractor, TransportRequest,
};

const EXTRACT_PROJECT: &str = "extract_project";
const EXTRACT_PERIOD: &str = "extract_period";
const EXTRACT_COVERAGE: &str = "extract_coverage";

pub struct LlmStructuredExtractor {
    transport: Arc<dyn ExtractionTransport>,
}

impl LlmStructuredExtractor {
    pub fn new(transport: Arc<dyn ExtractionTransport>) -> Self {
        Self { transport }
    }

    /// One transport round trip decoded into `T`.
    async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        prompt: &str,
        schema: serde_json::Value,
        text: &str,
    ) -> Result<T, ExtractionError> {
        let request = TransportRequest::new(operation, SYSTEM_PROMPT)
            .with_message(ChatMessage::user(prompts::user_message(prompt, text)))
            .with_schema(schema);

        let started = Instant::now();
        let response = self.transport.execute(&request).await?;
        let usage = response.usage.unwrap_or_default();
        info!(
            operation,
            model = %response.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total(),
            "extraction completed"
        );

        let content = response
            .content
            .ok_or_else(|| ExtractionError::malformed(operation, "response had no content"))?;
        let cleaned = extract_json_object(&content);

        serde_json::from_str(&cleaned).map_err(|e| {
            warn!(
                operation,
                error = %e,
                payload_preview = %payload_preview(&cleaned),
                "model output did not match the expected shape"
            );
            ExtractionError::malformed(operation, format!("unexpected payload: {}", e))
        })
    }
}

fn confidence_of(raw: Option<&str>) -> ExtractionConfidence {
    raw.map(ExtractionConfidence::parse_lenient).unwrap_or_default()
}

fn resolve_project(
    payload: ProjectPayload,
    registry: &dyn ProjectRegistry,
) -> Result<ProjectCandidate, ExtractionError> {
    let confidence = confidence_of(payload.confidence.as_deref());

    let mut resolved: Vec<ProjectId> = Vec::new();
    for candidate in &payload.candidates {
        if let Some(id) = registry.resolve(candidate) {
            if !resolved.contains(&id) {
                resolved.push(id);
            }
        }
    }
    if resolved.len() > 1 {
        return Err(ExtractionError::multiple(
            SubmissionField::Project,
            resolved.iter().map(|id| id.to_string()).collect(),
        ));
    }

    let named = payload
        .project_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match named {
        Some(name) => registry
            .resolve(name)
            .map(|project_id| ProjectCandidate {
                project_id,
                confidence,
            })
            .ok_or_else(|| ExtractionError::unknown(SubmissionField::Project, name)),
        None => match resolved.pop() {
            Some(project_id) => Ok(ProjectCandidate {
                project_id,
                confidence,
            }),
            None => Err(ExtractionError::missing(SubmissionField::Project)),
        },
    }
}

fn period_statement(payload: &PeriodPayload) -> Result<PeriodStatement, ExtractionError> {
    let month = payload
        .month
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());

    let kind = match (payload.kind, month) {
        (Some(kind), _) => kind,
        (None, Some(_)) => PeriodKind::IsoMonth,
        (None, None) => PeriodKind::Unspecified,
    };

    match kind {
        PeriodKind::CurrentMonth => Ok(PeriodStatement::CurrentMonth),
        PeriodKind::PreviousMonth => Ok(PeriodStatement::PreviousMonth),
        PeriodKind::Unspecified => Ok(PeriodStatement::Unspecified),
        PeriodKind::IsoMonth => {
            let month = month.ok_or_else(|| {
                ExtractionError::malformed(EXTRACT_PERIOD, "iso_month without a month")
            })?;
            TimeWindow::from_str(month)
                .map(PeriodStatement::Explicit)
                .map_err(|e| ExtractionError::malformed(EXTRACT_PERIOD, e.to_string()))
        }
    }
}

#[async_trait]
impl StructuredExtractor for LlmStructuredExtractor {
    async fn extract_project_id(
        &self,
        text: &str,
        registry: &dyn ProjectRegistry,
    ) -> Result<ProjectCandidate, ExtractionError> {
        let prompt = prompts::project_prompt(registry);
        let payload: ProjectPayload = self
            .call(EXTRACT_PROJECT, &prompt, project_schema(), text)
            .await?;
        resolve_project(payload, registry)
    }

    async fn extract_period(&self, text: &str) -> Result<PeriodCandidate, ExtractionError> {
        let payload: PeriodPayload = self
            .call(EXTRACT_PERIOD, PERIOD_PROMPT, period_schema(), text)
            .await?;
        Ok(PeriodCandidate {
            statement: period_statement(&payload)?,
            confidence: confidence_of(payload.confidence.as_deref()),
        })
    }

    async fn extract_coverage(&self, text: &str) -> Result<CoverageCandidate, ExtractionError> {
        let payload: CoveragePayload = self
            .call(EXTRACT_COVERAGE, COVERAGE_PROMPT, coverage_schema(), text)
            .await?;

        if let Some((field, value)) = payload.first_out_of_range() {
            return Err(ExtractionError::malformed(
                EXTRACT_COVERAGE,
                format!("{} must be between 0 and {}, got {}", field, MAX_TEST_CASES, value),
            ));
        }

        Ok(CoverageCandidate {
            draft: payload.draft(),
            confidence: confidence_of(payload.confidence.as_deref()),
        })
    }
}
