use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A policy snippet stored in the knowledge base, as returned by a
/// nearest-neighbour query. The stored embedding itself is never loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: Option<String>,
    /// Fingerprint of the source file the snippet was cut from.
    pub fp: Option<String>,
    pub chunk_index: Option<i64>,
    pub content: String,
    pub meta_info: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub file_id: Option<String>,
    pub organization_id: Option<String>,
    pub is_knowledge_base: bool,
    /// Cosine distance to the query vector (smaller is closer).
    pub distance: f64,
}

impl KnowledgeEntry {
    /// Entry with only content and metadata set; handy for fakes and tests.
    pub fn with_content(content: impl Into<String>, meta_info: Option<&str>) -> Self {
        Self {
            content: content.into(),
            meta_info: meta_info.map(str::to_string),
            is_knowledge_base: true,
            ..Default::default()
        }
    }
}
