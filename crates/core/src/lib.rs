pub mod config;
pub mod error;
pub mod knowledge;
pub mod retry;

pub use config::Config;
pub use error::*;
pub use knowledge::KnowledgeEntry;
pub use retry::{RetryPolicy, Retryable};
