//! Error types for the anomaly pipeline.
//!
//! Parsing and protocol errors carry a structured [`ErrorContext`] so that log
//! lines and HTTP error bodies can point at the offending row or field.
//! Transport failures of the remote collaborators are *not* errors: they are
//! returned as values (see [`crate::api::DetectionOutcome`]) and degrade to an
//! empty result.

use std::fmt;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Structured context for pipeline errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "parse_table", "detect_batch")
    pub operation: Option<String>,
    /// Index of the telemetry row involved, if any
    pub row: Option<usize>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// Set the row index.
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    /// Set additional details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(row) = self.row {
            parts.push(format!("row={}", row));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for pipeline operations.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A timestamp cell could not be parsed as an instant.
    #[error("Malformed timestamp '{literal}' {context}")]
    MalformedTimestamp {
        literal: String,
        context: ErrorContext,
    },

    /// A value cell could not be parsed as a finite decimal.
    #[error("Malformed value '{literal}' {context}")]
    MalformedValue {
        literal: String,
        context: ErrorContext,
    },

    /// A collaborator answered with a body that breaks the detection contract
    /// (undecodable JSON or per-index arrays of the wrong length).
    #[error("Protocol violation: {message} {context}")]
    ProtocolViolation {
        message: String,
        context: ErrorContext,
    },
}

impl PipelineError {
    /// Create a malformed timestamp error for a given row.
    pub fn malformed_timestamp(literal: impl Into<String>, row: usize) -> Self {
        Self::MalformedTimestamp {
            literal: literal.into(),
            context: ErrorContext::new("parse_table").with_row(row),
        }
    }

    /// Create a malformed value error for a given row.
    pub fn malformed_value(literal: impl Into<String>, row: usize) -> Self {
        Self::MalformedValue {
            literal: literal.into(),
            context: ErrorContext::new("parse_table").with_row(row),
        }
    }

    /// Create a protocol violation error.
    pub fn protocol(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ProtocolViolation {
            message: message.into(),
            context,
        }
    }

    /// Whether the error was caused by the caller's input rather than a collaborator.
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            Self::MalformedTimestamp { .. } | Self::MalformedValue { .. }
        )
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::MalformedTimestamp { context, .. } => context,
            Self::MalformedValue { context, .. } => context,
            Self::ProtocolViolation { context, .. } => context,
        }
    }
}
