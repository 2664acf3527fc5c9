//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction or finalization checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Field '{field}' must be non-negative, got {actual}")]
    Negative { field: String, actual: i64 },

    #[error("Reporting month {window} is after the current reporting month {current}")]
    FutureWindow { window: String, current: String },

    #[error("Project '{project}' is not a known active project")]
    UnknownProject { project: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a negative value validation error.
    pub fn negative(field: impl Into<String>, actual: i64) -> Self {
        ValidationError::Negative {
            field: field.into(),
            actual,
        }
    }

    /// Creates a future reporting window error.
    pub fn future_window(window: impl fmt::Display, current: impl fmt::Display) -> Self {
        ValidationError::FutureWindow {
            window: window.to_string(),
            current: current.to_string(),
        }
    }

    /// Creates an unknown project error.
    pub fn unknown_project(project: impl Into<String>) -> Self {
        ValidationError::UnknownProject {
            project: project.into(),
        }
    }

    /// Maps the variant onto its machine-readable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ValidationError::EmptyField { .. } => ErrorCode::EmptyField,
            ValidationError::OutOfRange { .. } => ErrorCode::OutOfRange,
            ValidationError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            ValidationError::Negative { .. } => ErrorCode::NegativeValue,
            ValidationError::FutureWindow { .. } => ErrorCode::FutureReportingWindow,
            ValidationError::UnknownProject { .. } => ErrorCode::UnknownProject,
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    EmptyField,
    OutOfRange,
    InvalidFormat,
    NegativeValue,
    FutureReportingWindow,
    UnknownProject,

    // Conversation errors
    SessionClosed,
    ClarificationLimitExceeded,

    // Extraction errors
    ExtractionFailed,
    AmbiguousExtraction,
    TransportFailed,

    // Infrastructure errors
    StorageError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::NegativeValue => "NEGATIVE_VALUE",
            ErrorCode::FutureReportingWindow => "FUTURE_REPORTING_WINDOW",
            ErrorCode::UnknownProject => "UNKNOWN_PROJECT",
            ErrorCode::SessionClosed => "SESSION_CLOSED",
            ErrorCode::ClarificationLimitExceeded => "CLARIFICATION_LIMIT_EXCEEDED",
            ErrorCode::ExtractionFailed => "EXTRACTION_FAILED",
            ErrorCode::AmbiguousExtraction => "AMBIGUOUS_EXTRACTION",
            ErrorCode::TransportFailed => "TRANSPORT_FAILED",
            ErrorCode::StorageError => "STORAGE_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let code = err.code();
        DomainError::new(code, err.to_string())
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}
