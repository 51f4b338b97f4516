use std::path::PathBuf;

use clap::Parser;
use redline_core::Config;

/// Revise a contract so it aligns with company policy.
///
/// Reads a PDF or DOCX contract, looks up the most relevant policy entries
/// in the knowledge base, and saves an LLM-revised copy. Without `--input`
/// it runs interactively and offers to process further contracts.
#[derive(Parser, Debug)]
#[command(name = "redline", about = "Policy-aligned contract revision")]
pub struct CliArgs {
    /// Contract to revise (.pdf or .docx). Runs once, without prompts.
    #[arg(long, env = "REDLINE_INPUT")]
    pub input: Option<PathBuf>,

    /// Where to save the revision (default: <input>_revised next to the input)
    #[arg(long, env = "REDLINE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Maximum words per chunk (overrides CHUNK_SIZE)
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Sentences shared by adjacent chunks (overrides CHUNK_OVERLAP)
    #[arg(long)]
    pub chunk_overlap: Option<usize>,

    /// Knowledge base entries retrieved per chunk (overrides KB_TOP_K)
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Type file paths instead of using native file dialogs
    #[arg(long)]
    pub console: bool,

    /// Hide step-by-step progress output (prompts are still shown)
    #[arg(long, short)]
    pub quiet: bool,
}

impl CliArgs {
    /// Apply command-line overrides on top of the environment config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(size) = self.chunk_size {
            config.chunking.chunk_size = size;
        }
        if let Some(overlap) = self.chunk_overlap {
            config.chunking.chunk_overlap = overlap;
        }
        if let Some(k) = self.top_k {
            config.database.top_k = k;
        }
    }

    pub fn is_headless(&self) -> bool {
        self.input.is_some()
    }
}
