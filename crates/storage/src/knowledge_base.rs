use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pgvector::Vector;
use redline_core::config::DatabaseConfig;
use redline_core::KnowledgeEntry;
use sqlx::postgres::PgRow;
use sqlx::{Connection, PgConnection, Row};
use tracing::{debug, info, warn};

use crate::error::StoreError;

pub const TABLE_NAME: &str = "knowledge_base";

/// Columns the nearest-neighbour query cannot do without.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "id",
    "fp",
    "chunk_index",
    "content",
    "embedding",
    "is_knowledge_base",
];

/// Cosine distance (`<=>`), closest first. Columns are cast so that text-like
/// and integer columns decode regardless of their exact declared types.
const NEAREST_SQL: &str = "SELECT id::text AS id, fp::text AS fp, \
     chunk_index::bigint AS chunk_index, COALESCE(content::text, '') AS content, \
     meta_info::text AS meta_info, \
     created_at::timestamptz AS created_at, updated_at::timestamptz AS updated_at, \
     file_id::text AS file_id, organization_id::text AS organization_id, \
     COALESCE(is_knowledge_base, FALSE) AS is_knowledge_base, \
     (embedding <=> $1::vector)::float8 AS distance \
     FROM knowledge_base \
     WHERE is_knowledge_base = TRUE \
     ORDER BY distance ASC \
     LIMIT $2";

const TABLE_EXISTS_SQL: &str =
    "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = $1)";

const VECTOR_EXTENSION_SQL: &str =
    "SELECT EXISTS (SELECT 1 FROM pg_extension WHERE extname = 'vector')";

const COLUMNS_SQL: &str =
    "SELECT column_name::text FROM information_schema.columns WHERE table_name = $1";

/// Source of policy entries nearest to an embedding.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Up to `k` knowledge-base entries ordered by ascending distance.
    async fn query_nearest(&self, vector: &[f32], k: usize) -> Result<Vec<KnowledgeEntry>, StoreError>;

    /// Confirm the table, the `vector` extension and the required columns exist.
    async fn verify_schema(&self) -> Result<(), StoreError>;
}

/// Knowledge base in PostgreSQL with pgvector. Every operation opens its own
/// connection and closes it before returning.
pub struct PgKnowledgeBase {
    url: String,
}

impl PgKnowledgeBase {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn from_config(config: &DatabaseConfig) -> Result<Self, StoreError> {
        config
            .url
            .as_deref()
            .map(Self::new)
            .ok_or_else(|| StoreError::NotConfigured("DATABASE_URL is not set".into()))
    }

    async fn connect(&self) -> Result<PgConnection, StoreError> {
        Ok(PgConnection::connect(&self.url).await?)
    }
}

async fn close(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close database connection: {e}");
    }
}

#[async_trait]
impl KnowledgeBase for PgKnowledgeBase {
    async fn query_nearest(&self, vector: &[f32], k: usize) -> Result<Vec<KnowledgeEntry>, StoreError> {
        if vector.is_empty() {
            warn!("No embedding provided for similarity search");
            return Ok(Vec::new());
        }

        let mut conn = self.connect().await?;
        let result = fetch_nearest(&mut conn, vector, k).await;
        close(conn).await;

        let entries = result?;
        debug!(k, found = entries.len(), "Knowledge base query");
        Ok(entries)
    }

    async fn verify_schema(&self) -> Result<(), StoreError> {
        let mut conn = self.connect().await?;
        let result = check_schema(&mut conn).await;
        close(conn).await;

        result?;
        info!(table = TABLE_NAME, "Database connection successful, knowledge base schema verified");
        Ok(())
    }
}

async fn fetch_nearest(
    conn: &mut PgConnection,
    vector: &[f32],
    k: usize,
) -> Result<Vec<KnowledgeEntry>, StoreError> {
    let limit = i64::try_from(k).unwrap_or(i64::MAX);
    let rows = sqlx::query(NEAREST_SQL)
        .bind(Vector::from(vector.to_vec()))
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

    rows.iter()
        .map(entry_from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from)
}

fn entry_from_row(row: &PgRow) -> Result<KnowledgeEntry, sqlx::Error> {
    Ok(KnowledgeEntry {
        id: row.try_get("id")?,
        fp: row.try_get("fp")?,
        chunk_index: row.try_get("chunk_index")?,
        content: row.try_get("content")?,
        meta_info: row.try_get("meta_info")?,
        created_at: row.try_get::<Option<DateTime<Utc>>, _>("created_at")?,
        updated_at: row.try_get::<Option<DateTime<Utc>>, _>("updated_at")?,
        file_id: row.try_get("file_id")?,
        organization_id: row.try_get("organization_id")?,
        is_knowledge_base: row.try_get("is_knowledge_base")?,
        distance: row.try_get::<Option<f64>, _>("distance")?.unwrap_or(f64::MAX),
    })
}

async fn check_schema(conn: &mut PgConnection) -> Result<(), StoreError> {
    if let Err(e) = sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
        .execute(&mut *conn)
        .await
    {
        warn!("Could not create the vector extension: {e}");
    }

    let table_exists: bool = sqlx::query_scalar(TABLE_EXISTS_SQL)
        .bind(TABLE_NAME)
        .fetch_one(&mut *conn)
        .await?;
    if !table_exists {
        return Err(StoreError::SchemaInvalid(format!(
            "The '{TABLE_NAME}' table does not exist in the database"
        )));
    }

    let vector_exists: bool = sqlx::query_scalar(VECTOR_EXTENSION_SQL)
        .fetch_one(&mut *conn)
        .await?;
    if !vector_exists {
        return Err(StoreError::SchemaInvalid(
            "The 'pgvector' extension is not installed in the database".into(),
        ));
    }

    let columns: Vec<String> = sqlx::query_scalar(COLUMNS_SQL)
        .bind(TABLE_NAME)
        .fetch_all(&mut *conn)
        .await?;
    let missing = missing_columns(&columns);
    if !missing.is_empty() {
        return Err(StoreError::SchemaInvalid(format!(
            "The '{TABLE_NAME}' table is missing required columns: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

/// Required columns absent from `present`, in declaration order.
pub fn missing_columns(present: &[String]) -> Vec<&'static str> {
    REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !present.iter().any(|c| c == required))
        .collect()
}

/// Query the nearest entries for each vector, one query at a time. A failed
/// query yields an empty list for that vector.
pub async fn query_batch(
    kb: &dyn KnowledgeBase,
    vectors: &[Vec<f32>],
    k: usize,
) -> Vec<Vec<KnowledgeEntry>> {
    let mut results = Vec::with_capacity(vectors.len());
    for (i, vector) in vectors.iter().enumerate() {
        match kb.query_nearest(vector, k).await {
            Ok(entries) => results.push(entries),
            Err(e) => {
                warn!(index = i, "Error finding similar entries: {e}");
                results.push(Vec::new());
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use redline_core::PipelineError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeKnowledgeBase {
        calls: AtomicUsize,
        failing_call: usize,
    }

    #[async_trait]
    impl KnowledgeBase for FakeKnowledgeBase {
        async fn query_nearest(&self, vector: &[f32], k: usize) -> Result<Vec<KnowledgeEntry>, StoreError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == self.failing_call {
                return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok((0..k)
                .map(|i| KnowledgeEntry {
                    distance: i as f64,
                    ..KnowledgeEntry::with_content(format!("policy {} #{i}", vector[0]), None)
                })
                .collect())
        }

        async fn verify_schema(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn reports_missing_columns_in_order() {
        let present: Vec<String> = ["id", "content", "embedding", "meta_info"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(missing_columns(&present), vec!["fp", "chunk_index", "is_knowledge_base"]);

        let all: Vec<String> = REQUIRED_COLUMNS.iter().map(|s| s.to_string()).collect();
        assert!(missing_columns(&all).is_empty());
    }

    #[test]
    fn nearest_query_filters_and_orders() {
        assert!(NEAREST_SQL.contains("FROM knowledge_base"));
        assert!(NEAREST_SQL.contains("WHERE is_knowledge_base = TRUE"));
        assert!(NEAREST_SQL.contains("<=> $1::vector"));
        assert!(NEAREST_SQL.contains("ORDER BY distance ASC"));
        assert!(!NEAREST_SQL.contains("SELECT embedding"));
    }

    #[test]
    fn missing_url_is_not_configured() {
        let config = DatabaseConfig { url: None, top_k: 5 };
        let err = PgKnowledgeBase::from_config(&config).err().unwrap();
        assert!(matches!(PipelineError::from(err), PipelineError::ConfigurationMissing(_)));
    }

    #[test]
    fn schema_errors_map_to_schema_invalid() {
        let err = StoreError::SchemaInvalid("missing fp".into());
        assert!(matches!(
            PipelineError::from(err),
            PipelineError::DatabaseSchemaInvalid(ref m) if m == "missing fp"
        ));
    }

    #[tokio::test]
    async fn unreachable_database_is_unavailable() {
        let kb = PgKnowledgeBase::new("not a connection string");
        let err = kb.verify_schema().await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
        assert!(matches!(PipelineError::from(err), PipelineError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn empty_vector_skips_the_database() {
        let kb = PgKnowledgeBase::new("not a connection string");
        assert!(kb.query_nearest(&[], 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn batch_queries_in_order_and_tolerates_failures() {
        let kb = FakeKnowledgeBase {
            calls: AtomicUsize::new(0),
            failing_call: 1,
        };
        let vectors = vec![vec![1.0], vec![2.0], vec![3.0]];

        let results = query_batch(&kb, &vectors, 2).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0][0].content, "policy 1 #0");
        assert!(results[1].is_empty());
        assert_eq!(results[2][1].content, "policy 3 #1");
        assert_eq!(kb.calls.load(Ordering::SeqCst), 3);
    }
}
