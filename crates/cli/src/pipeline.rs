//! The seven-step revision workflow for a single contract.

use std::path::{Path, PathBuf};

use redline_core::{Config, KnowledgeEntry, PipelineError, RetryPolicy};
use redline_ingest::chunker::{ChunkConfig, Chunker};
use redline_ingest::{read_document, write_document, EmbeddingClient};
use redline_llm::ContractReviser;
use redline_storage::{query_batch, KnowledgeBase, PgKnowledgeBase};
use tracing::{debug, info, warn};

use crate::paths::PathProvider;
use crate::terminal::Terminal;

/// How a run ended when nothing went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Saved(RunSummary),
    NoInputSelected,
    NoOutputSelected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub chunks: usize,
    pub embedded: usize,
    pub entries: usize,
}

/// `<stem>_revised<ext>` for the input file name.
pub fn suggested_output_name(input: &Path, ext: &str) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "contract".to_string());
    format!("{stem}_revised{ext}")
}

/// Truncate both stages to the shorter length, warning when they differ.
pub fn align_stages<A, B>(mut left: Vec<A>, mut right: Vec<B>) -> (Vec<A>, Vec<B>) {
    if left.len() != right.len() {
        let len = left.len().min(right.len());
        warn!(
            chunks = left.len(),
            results = right.len(),
            kept = len,
            "Mismatch between valid chunks and similar entries, truncating"
        );
        left.truncate(len);
        right.truncate(len);
    }
    (left, right)
}

/// Log a failed console write at debug level; the run carries on.
fn shown(result: anyhow::Result<()>) {
    if let Err(e) = result {
        debug!("Terminal write failed: {e}");
    }
}

pub struct Pipeline {
    chunker: Chunker,
    embeddings: EmbeddingClient,
    knowledge_base: Box<dyn KnowledgeBase>,
    reviser: ContractReviser,
    top_k: usize,
    terminal: Terminal,
}

impl Pipeline {
    pub fn new(
        chunker: Chunker,
        embeddings: EmbeddingClient,
        knowledge_base: Box<dyn KnowledgeBase>,
        reviser: ContractReviser,
        top_k: usize,
        terminal: Terminal,
    ) -> Self {
        Self {
            chunker,
            embeddings,
            knowledge_base,
            reviser,
            top_k,
            terminal,
        }
    }

    /// Wire up every collaborator from config.
    pub fn from_config(config: &Config, terminal: Terminal) -> Result<Self, PipelineError> {
        let retry = RetryPolicy::from_config(&config.retry);
        let chunker = Chunker::new(ChunkConfig::from(&config.chunking));
        let embeddings = EmbeddingClient::from_config(config)?.with_progress(true);
        let knowledge_base = PgKnowledgeBase::from_config(&config.database)?;
        let reviser = ContractReviser::from_config(&config.llm, &config.ollama, retry)?;
        Ok(Self::new(
            chunker,
            embeddings,
            Box::new(knowledge_base),
            reviser,
            config.database.top_k,
            terminal,
        ))
    }

    /// Run the whole workflow for one contract.
    pub async fn process(&self, paths: &dyn PathProvider) -> Result<Outcome, PipelineError> {
        let term = &self.terminal;

        info!("Testing database connection");
        self.knowledge_base.verify_schema().await?;

        shown(term.print_step(1, "Please select a contract file (PDF or DOCX)..."));
        let Some(input) = paths.choose_input() else {
            shown(term.print_info("No file selected."));
            return Ok(Outcome::NoInputSelected);
        };
        shown(term.print_info(&format!("Selected file: {}", input.display())));

        shown(term.print_step(2, "Reading the file content..."));
        let (text, ext) = read_document(&input)?;

        shown(term.print_step(3, "Splitting the contract into chunks..."));
        let chunks = self.chunker.chunk(&text);
        if chunks.is_empty() {
            return Err(PipelineError::EmptyInput(
                "the contract produced no chunks".into(),
            ));
        }
        shown(term.print_info(&format!("Split the contract into {} chunks.", chunks.len())));

        shown(term.print_step(4, "Generating embeddings for the contract chunks..."));
        let embeddings = self.embeddings.embed_all(&chunks).await;
        let (valid_chunks, vectors): (Vec<String>, Vec<Vec<f32>>) = chunks
            .iter()
            .zip(embeddings)
            .filter_map(|(chunk, vector)| vector.map(|v| (chunk.clone(), v)))
            .unzip();
        if vectors.is_empty() {
            return Err(PipelineError::ServiceUnavailable(
                "failed to generate embeddings; check the embedding service credentials".into(),
            ));
        }
        shown(term.print_info(&format!("Generated embeddings for {} chunks.", vectors.len())));

        shown(term.print_step(5, "Finding similar entries in the knowledge base..."));
        let similar: Vec<Vec<KnowledgeEntry>> =
            query_batch(self.knowledge_base.as_ref(), &vectors, self.top_k).await;
        let entries: usize = similar.iter().map(Vec::len).sum();
        shown(term.print_info(&format!("Found {entries} relevant entries in the knowledge base.")));

        shown(term.print_step(6, "Revising the contract..."));
        let (valid_chunks, similar) = align_stages(valid_chunks, similar);
        let Some(revised) = self.reviser.revise(&valid_chunks, &similar).await else {
            return Err(PipelineError::ServiceUnavailable(
                "failed to revise the contract; check the LLM service".into(),
            ));
        };

        shown(term.print_step(7, "Saving the revised contract..."));
        let suggested = suggested_output_name(&input, &ext);
        let directory = input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let Some(output) = paths.choose_output(&suggested, directory) else {
            shown(term.print_info("No save location selected. Exiting without saving."));
            return Ok(Outcome::NoOutputSelected);
        };
        info!(path = %output.display(), "Saving revised contract");

        if let Some(dir) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    PipelineError::PersistenceFailure(format!(
                        "cannot create {}: {e}",
                        dir.display()
                    ))
                })?;
            }
        }
        write_document(&revised, &output)?;
        shown(term.print_success(&format!(
            "Revised contract saved successfully to: {}",
            output.display()
        )));

        Ok(Outcome::Saved(RunSummary {
            input,
            output,
            chunks: chunks.len(),
            embedded: vectors.len(),
            entries,
        }))
    }
}

#[cfg(test)]
mod tests;
