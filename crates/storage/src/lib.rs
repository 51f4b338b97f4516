//! Read-only access to the pgvector knowledge base of company policies.

pub mod error;
pub mod knowledge_base;

pub use error::StoreError;
pub use knowledge_base::{query_batch, KnowledgeBase, PgKnowledgeBase, REQUIRED_COLUMNS, TABLE_NAME};
pub use redline_core::KnowledgeEntry;
