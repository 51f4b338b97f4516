//! Pipeline tests with in-memory collaborators.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use redline_core::{KnowledgeEntry, PipelineError, RetryPolicy};
use redline_ingest::chunker::{ChunkConfig, Chunker};
use redline_ingest::embedding::{Embedder, EmbeddingClient, EmbeddingError};
use redline_ingest::{read_document, write_document};
use redline_llm::{ContractReviser, LlmError, LlmProvider, Message};
use redline_storage::{KnowledgeBase, StoreError};

use super::{align_stages, shown, suggested_output_name, Outcome, Pipeline};
use crate::paths::{FixedPathProvider, PathProvider};
use crate::terminal::Terminal;

// ── Fakes ───────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeEmbedder {
    calls: Arc<AtomicUsize>,
    failing_calls: Vec<usize>,
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_calls.contains(&call) {
            return Err(EmbeddingError::Api("401: invalid key".into()));
        }
        Ok(texts.iter().map(|t| vec![t.len() as f32]).collect())
    }

    fn dimensions(&self) -> Option<usize> {
        None
    }
}

#[derive(Default)]
struct FakeKnowledgeBase {
    queries: Arc<AtomicUsize>,
    schema_problem: Option<String>,
}

#[async_trait]
impl KnowledgeBase for FakeKnowledgeBase {
    async fn query_nearest(&self, vector: &[f32], _k: usize) -> Result<Vec<KnowledgeEntry>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(vec![KnowledgeEntry::with_content(
            format!("Policy for {}", vector[0]),
            Some("policies.pdf"),
        )])
    }

    async fn verify_schema(&self) -> Result<(), StoreError> {
        match &self.schema_problem {
            Some(problem) => Err(StoreError::SchemaInvalid(problem.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
struct FakeProvider {
    calls: Arc<AtomicUsize>,
    last_user_message: Arc<Mutex<String>>,
    reply: Option<String>,
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        _temperature: f32,
        _max_tokens: u32,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(user) = messages.last() {
            *self.last_user_message.lock().unwrap() = user.content.clone();
        }
        self.reply.clone().ok_or(LlmError::ApiError {
            status: 500,
            body: "model overloaded".into(),
        })
    }
}

/// Path provider that records how often it is asked.
struct CountingPaths {
    inner: FixedPathProvider,
    input_requests: AtomicUsize,
}

impl CountingPaths {
    fn new(input: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        Self {
            inner: FixedPathProvider::new(input, output),
            input_requests: AtomicUsize::new(0),
        }
    }
}

impl PathProvider for CountingPaths {
    fn choose_input(&self) -> Option<PathBuf> {
        self.input_requests.fetch_add(1, Ordering::SeqCst);
        self.inner.choose_input()
    }

    fn choose_output(&self, suggested_name: &str, directory: &Path) -> Option<PathBuf> {
        self.inner.choose_output(suggested_name, directory)
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

const CONTRACT: &str = "Alpha beta gamma delta. Epsilon zeta eta theta.";
const REVISION: &str = "Revised clause one.\nRevised clause two.";

fn pipeline(
    embedder: FakeEmbedder,
    knowledge_base: FakeKnowledgeBase,
    provider: FakeProvider,
) -> Pipeline {
    Pipeline::new(
        Chunker::new(ChunkConfig::new(4, 0)),
        EmbeddingClient::new(Arc::new(embedder), 1, RetryPolicy::default()),
        Box::new(knowledge_base),
        ContractReviser::new(Box::new(provider), RetryPolicy::default(), 0.2, 8000),
        5,
        Terminal::quiet(),
    )
}

fn replying_provider() -> FakeProvider {
    FakeProvider {
        reply: Some(REVISION.into()),
        ..Default::default()
    }
}

fn write_contract(dir: &Path) -> PathBuf {
    let path = dir.join("contract.docx");
    write_document(CONTRACT, &path).unwrap();
    path
}

// ── End to end ──────────────────────────────────────────────────────

#[tokio::test]
async fn revises_and_saves_into_new_directory() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_contract(dir.path());
    let output = dir.path().join("out/nested/revised.docx");

    let queries = Arc::new(AtomicUsize::new(0));
    let last_user_message = Arc::new(Mutex::new(String::new()));
    let pipeline = pipeline(
        FakeEmbedder::default(),
        FakeKnowledgeBase {
            queries: queries.clone(),
            ..Default::default()
        },
        FakeProvider {
            last_user_message: last_user_message.clone(),
            ..replying_provider()
        },
    );

    let outcome = pipeline
        .process(&FixedPathProvider::new(Some(input.clone()), Some(output.clone())))
        .await
        .unwrap();

    let Outcome::Saved(summary) = outcome else {
        panic!("expected a saved revision, got {outcome:?}");
    };
    assert_eq!(summary.input, input);
    assert_eq!(summary.output, output);
    assert_eq!(summary.chunks, 2);
    assert_eq!(summary.embedded, 2);
    assert_eq!(summary.entries, 2);
    assert_eq!(queries.load(Ordering::SeqCst), 2);

    let request = last_user_message.lock().unwrap().clone();
    assert!(request.contains("Alpha beta gamma delta.\n\nEpsilon zeta eta theta."));
    assert!(request.contains("--- Metadata: policies.pdf ---"));

    let (saved, ext) = read_document(&output).unwrap();
    assert_eq!(ext, ".docx");
    assert_eq!(saved, REVISION);
}

#[tokio::test]
async fn default_output_sits_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_contract(dir.path());
    let pipeline = pipeline(
        FakeEmbedder::default(),
        FakeKnowledgeBase::default(),
        replying_provider(),
    );

    let outcome = pipeline
        .process(&FixedPathProvider::new(Some(input), None))
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Saved(_)));
    assert!(dir.path().join("contract_revised.docx").exists());
}

#[tokio::test]
async fn chunks_without_embeddings_are_left_out() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_contract(dir.path());
    let last_user_message = Arc::new(Mutex::new(String::new()));
    let pipeline = pipeline(
        FakeEmbedder {
            failing_calls: vec![0],
            ..Default::default()
        },
        FakeKnowledgeBase::default(),
        FakeProvider {
            last_user_message: last_user_message.clone(),
            ..replying_provider()
        },
    );

    let outcome = pipeline
        .process(&FixedPathProvider::new(Some(input), None))
        .await
        .unwrap();

    let Outcome::Saved(summary) = outcome else {
        panic!("expected a saved revision, got {outcome:?}");
    };
    assert_eq!(summary.chunks, 2);
    assert_eq!(summary.embedded, 1);
    let request = last_user_message.lock().unwrap().clone();
    assert!(!request.contains("Alpha"));
    assert!(request.contains("Epsilon zeta eta theta."));
}

// ── Failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn invalid_schema_stops_before_asking_for_a_file() {
    let pipeline = pipeline(
        FakeEmbedder::default(),
        FakeKnowledgeBase {
            schema_problem: Some("missing required columns: fp".into()),
            ..Default::default()
        },
        replying_provider(),
    );
    let paths = CountingPaths::new(Some("contract.pdf".into()), None);

    let err = pipeline.process(&paths).await.unwrap_err();

    assert!(matches!(err, PipelineError::DatabaseSchemaInvalid(ref m) if m.contains("fp")));
    assert_eq!(paths.input_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn nothing_selected_is_not_an_error() {
    let pipeline = pipeline(
        FakeEmbedder::default(),
        FakeKnowledgeBase::default(),
        replying_provider(),
    );
    let outcome = pipeline.process(&FixedPathProvider::default()).await.unwrap();
    assert_eq!(outcome, Outcome::NoInputSelected);
}

#[tokio::test]
async fn unsupported_input_is_rejected() {
    let pipeline = pipeline(
        FakeEmbedder::default(),
        FakeKnowledgeBase::default(),
        replying_provider(),
    );
    let err = pipeline
        .process(&FixedPathProvider::new(Some("notes.txt".into()), None))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedFormat(_)));
}

#[tokio::test]
async fn no_embeddings_aborts_before_revision() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_contract(dir.path());
    let llm_calls = Arc::new(AtomicUsize::new(0));
    let pipeline = pipeline(
        FakeEmbedder {
            failing_calls: vec![0, 1],
            ..Default::default()
        },
        FakeKnowledgeBase::default(),
        FakeProvider {
            calls: llm_calls.clone(),
            ..replying_provider()
        },
    );

    let err = pipeline
        .process(&FixedPathProvider::new(Some(input), None))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::ServiceUnavailable(_)));
    assert_eq!(llm_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_revision_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_contract(dir.path());
    let pipeline = pipeline(
        FakeEmbedder::default(),
        FakeKnowledgeBase::default(),
        FakeProvider::default(),
    );

    let err = pipeline
        .process(&FixedPathProvider::new(Some(input), None))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::ServiceUnavailable(_)));
    assert!(!dir.path().join("contract_revised.docx").exists());
}

// ── Helpers ─────────────────────────────────────────────────────────

#[test]
fn suggests_revised_name_with_same_extension() {
    assert_eq!(
        suggested_output_name(Path::new("/docs/Master Agreement.pdf"), ".pdf"),
        "Master Agreement_revised.pdf"
    );
    assert_eq!(suggested_output_name(Path::new("c.DOCX"), ".docx"), "c_revised.docx");
}

#[test]
fn align_truncates_to_shorter_stage() {
    let (a, b) = align_stages(vec![1, 2, 3], vec!["x", "y"]);
    assert_eq!(a, vec![1, 2]);
    assert_eq!(b, vec!["x", "y"]);

    let (a, b) = align_stages(vec![1], vec!["x"]);
    assert_eq!((a.len(), b.len()), (1, 1));
}

#[test]
fn failed_console_write_is_swallowed() {
    shown(Err(anyhow::anyhow!("broken pipe")));
    shown(Ok(()));
}
