use redline_core::PipelineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    SchemaInvalid(String),
}

impl From<StoreError> for PipelineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotConfigured(_) => PipelineError::ConfigurationMissing(e.to_string()),
            StoreError::Database(_) => PipelineError::ServiceUnavailable(e.to_string()),
            StoreError::SchemaInvalid(msg) => PipelineError::DatabaseSchemaInvalid(msg),
        }
    }
}
