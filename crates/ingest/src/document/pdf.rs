use std::panic::{self, AssertUnwindSafe};

use super::{ExtractionError, PageContent};

/// Run pdf-extract, turning its panics on malformed fonts or resources into
/// an extraction error.
fn extract_text_guarded(bytes: &[u8]) -> Result<String, ExtractionError> {
    match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(result) => result.map_err(|e| ExtractionError::PdfError(e.to_string())),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown cause".to_string());
            tracing::error!(%reason, "PDF parser aborted on malformed document");
            Err(ExtractionError::PdfError(format!("malformed PDF ({reason})")))
        }
    }
}

pub fn extract_pdf(bytes: &[u8]) -> Result<Vec<PageContent>, ExtractionError> {
    let text = extract_text_guarded(bytes)?;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        // Scanned/image PDFs extract to nothing; the caller reports it.
        tracing::warn!("PDF contains no extractable text");
        return Ok(Vec::new());
    }

    // pdf-extract returns all text as one string, with form feeds (\x0C)
    // between pages.
    let pages: Vec<PageContent> = if text.contains('\x0C') {
        text.split('\x0C')
            .enumerate()
            .filter(|(_, page_text)| !page_text.trim().is_empty())
            .map(|(i, page_text)| PageContent {
                page_number: i + 1,
                text: page_text.trim().to_string(),
            })
            .collect()
    } else {
        vec![PageContent {
            page_number: 1,
            text: trimmed.to_string(),
        }]
    };

    Ok(pages)
}
