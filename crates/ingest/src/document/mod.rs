//! Reading contract text out of PDF/DOCX files and writing revised text back.

mod docx;
mod pdf;
pub mod pdf_writer;

use std::path::Path;

use redline_core::PipelineError;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("PDF extraction failed: {0}")]
    PdfError(String),
    #[error("DOCX extraction failed: {0}")]
    DocxError(String),
    #[error("No text could be extracted from {0}")]
    Empty(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ExtractionError> for PipelineError {
    fn from(e: ExtractionError) -> Self {
        match e {
            ExtractionError::UnsupportedType(_) => PipelineError::UnsupportedFormat(e.to_string()),
            _ => PipelineError::ExtractionFailure(e.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("No text content to save")]
    EmptyText,
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("PDF generation failed: {0}")]
    PdfError(String),
    #[error("DOCX generation failed: {0}")]
    DocxError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<WriteError> for PipelineError {
    fn from(e: WriteError) -> Self {
        match e {
            WriteError::UnsupportedType(_) => PipelineError::UnsupportedFormat(e.to_string()),
            _ => PipelineError::PersistenceFailure(e.to_string()),
        }
    }
}

/// Supported contract file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Detect from the (case-insensitive) file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        Self::from_extension(&ext)
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }

    /// Extension including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => ".pdf",
            DocumentFormat::Docx => ".docx",
        }
    }
}

/// Lower-cased extension of `path` with its leading dot, or "" when absent.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// A page (PDF) or the whole body (DOCX) of extracted text.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// 1-based page number. DOCX bodies are always page 1.
    pub page_number: usize,
    pub text: String,
}

/// Result of extracting text from a document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub filename: String,
    pub format: DocumentFormat,
    pub pages: Vec<PageContent>,
}

impl ExtractedDocument {
    /// Get all text concatenated.
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Total character count across all pages.
    pub fn total_chars(&self) -> usize {
        self.pages.iter().map(|p| p.text.chars().count()).sum()
    }
}

/// Extract text from file bytes based on the filename's extension.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<ExtractedDocument, ExtractionError> {
    let format = DocumentFormat::from_path(Path::new(filename))
        .ok_or_else(|| ExtractionError::UnsupportedType(extension_of(Path::new(filename))))?;

    let pages = match format {
        DocumentFormat::Pdf => pdf::extract_pdf(bytes)?,
        DocumentFormat::Docx => docx::extract_docx(bytes)?,
    };

    Ok(ExtractedDocument {
        filename: filename.to_string(),
        format,
        pages,
    })
}

/// Read a contract file and return its text and lower-cased extension
/// (with leading dot, e.g. `".pdf"`).
pub fn read_document(path: &Path) -> Result<(String, String), ExtractionError> {
    let ext = extension_of(path);
    if DocumentFormat::from_extension(&ext).is_none() {
        return Err(ExtractionError::UnsupportedType(ext));
    }

    let bytes = std::fs::read(path)?;
    let filename = path.to_string_lossy();
    let doc = extract_text(&bytes, &filename)?;

    let text = doc.full_text();
    if text.trim().is_empty() {
        return Err(ExtractionError::Empty(filename.into_owned()));
    }
    info!(
        file = %filename,
        pages = doc.pages.len(),
        chars = doc.total_chars(),
        "Extracted document text"
    );
    Ok((text, ext))
}

/// Write `text` to `path`, choosing PDF or DOCX from the target extension.
pub fn write_document(text: &str, path: &Path) -> Result<(), WriteError> {
    if text.trim().is_empty() {
        return Err(WriteError::EmptyText);
    }
    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| WriteError::UnsupportedType(extension_of(path)))?;

    match format {
        DocumentFormat::Pdf => pdf_writer::write_pdf(text, path)?,
        DocumentFormat::Docx => docx::write_docx(text, path)?,
    }
    info!(file = %path.display(), "Saved revised document");
    Ok(())
}
