use thiserror::Error;

/// Failure taxonomy shared by every pipeline stage.
///
/// Library crates keep their own error enums and map into this one at the
/// stage boundary, so the orchestrator can report a single kind of failure.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Text extraction failed: {0}")]
    ExtractionFailure(String),

    #[error("Nothing to process: {0}")]
    EmptyInput(String),

    #[error("Service rate limited: {0}")]
    ServiceRateLimited(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Failed to persist output: {0}")]
    PersistenceFailure(String),

    #[error("Database schema invalid: {0}")]
    DatabaseSchemaInvalid(String),
}

impl PipelineError {
    /// Short machine-friendly name, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::ConfigurationMissing(_) => "configuration_missing",
            PipelineError::UnsupportedFormat(_) => "unsupported_format",
            PipelineError::ExtractionFailure(_) => "extraction_failure",
            PipelineError::EmptyInput(_) => "empty_input",
            PipelineError::ServiceRateLimited(_) => "service_rate_limited",
            PipelineError::ServiceUnavailable(_) => "service_unavailable",
            PipelineError::PersistenceFailure(_) => "persistence_failure",
            PipelineError::DatabaseSchemaInvalid(_) => "database_schema_invalid",
        }
    }
}

impl crate::retry::Retryable for PipelineError {
    fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::ServiceRateLimited(_))
    }
}
